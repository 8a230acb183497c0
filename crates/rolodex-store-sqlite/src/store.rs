//! [`SqliteStore`]: the SQLite implementation of [`PersonStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rolodex_core::{
  person::{ContactSummary, NewPerson, PageWindow, Person, PersonPage, PersonUpdate},
  store::PersonStore,
};
use rusqlite::{ErrorCode, OptionalExtension as _, ffi, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    PERSON_COLUMNS, RawContact, RawPerson, decode_dt, encode_date, encode_dt, encode_gender,
    encode_uuid,
  },
  schema::{NO_SELF_CONTACT, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rolodex person store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let id = Uuid::new_v4();
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| Ok(create_in_tx(conn, id, now, input)))
      .await?
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| Ok(fetch_person(conn, &id_str)))
      .await?
  }

  async fn update_person(&self, id: Uuid, update: PersonUpdate) -> Result<Option<Person>> {
    self
      .conn
      .call(move |conn| Ok(update_in_tx(conn, id, update)))
      .await?
  }

  async fn delete_person(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    // Links on either side go with the row via ON DELETE CASCADE.
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn list_people(&self, window: PageWindow) -> Result<PersonPage> {
    self
      .conn
      .call(move |conn| Ok(list_in_tx(conn, window)))
      .await?
  }
}

// ─── Transaction bodies ──────────────────────────────────────────────────────
//
// These run on the connection thread. A `Transaction` rolls back when dropped
// without `commit`, so every early `return Err(..)` leaves storage untouched.

fn create_in_tx(
  conn: &mut rusqlite::Connection,
  id: Uuid,
  now: i64,
  input: NewPerson,
) -> Result<Person> {
  let tx = conn.transaction()?;
  let id_str = encode_uuid(id);
  let contacts = dedup(input.contacts);

  // Cheap, precise referential error; the foreign keys remain the backstop.
  let missing = missing_ids(&tx, &contacts)?;
  if !missing.is_empty() {
    return Err(Error::UnknownContacts(missing));
  }

  tx.execute(
    "INSERT INTO persons (
       id, name, surname, gender, birthday, phone, email, created_at, modified_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    rusqlite::params![
      id_str,
      input.name,
      input.surname,
      input.gender.map(encode_gender),
      input.birthday.map(encode_date),
      input.phone,
      input.email,
      now,
    ],
  )
  .map_err(|e| row_write_error(e, &input.email))?;

  insert_links(&tx, id, &contacts)?;

  let person = fetch_person(&tx, &id_str)?
    .ok_or_else(|| Error::Decode(format!("inserted person {id} not readable")))?;
  tx.commit()?;
  Ok(person)
}

fn update_in_tx(
  conn: &mut rusqlite::Connection,
  id: Uuid,
  update: PersonUpdate,
) -> Result<Option<Person>> {
  let tx = conn.transaction()?;
  let id_str = encode_uuid(id);

  if !person_exists(&tx, &id_str)? {
    return Ok(None);
  }

  let changes_scalars = update.changes_scalars();
  if changes_scalars {
    let (sql, values) = scalar_update(&update, &id_str);
    let email = update.email.as_deref().unwrap_or_default();
    tx.execute(&sql, rusqlite::params_from_iter(values))
      .map_err(|e| row_write_error(e, email))?;
  }

  if let Some(contacts) = update.contacts {
    let contacts = dedup(contacts);
    if contacts.contains(&id) {
      return Err(Error::SelfContact(id));
    }

    tx.execute(
      "DELETE FROM contact_links WHERE person_id = ?1",
      rusqlite::params![id_str],
    )?;
    let missing = missing_ids(&tx, &contacts)?;
    if !missing.is_empty() {
      return Err(Error::UnknownContacts(missing));
    }
    insert_links(&tx, id, &contacts)?;

    // The contact set is part of the aggregate; make the trigger bump
    // modified_at even when no column changed.
    if !changes_scalars {
      tx.execute(
        "UPDATE persons SET modified_at = modified_at WHERE id = ?1",
        rusqlite::params![id_str],
      )?;
    }
  }

  let person = fetch_person(&tx, &id_str)?;
  tx.commit()?;
  Ok(person)
}

fn list_in_tx(conn: &mut rusqlite::Connection, window: PageWindow) -> Result<PersonPage> {
  // One snapshot for the totals and the page so the ETag describes the rows
  // actually returned.
  let tx = conn.transaction()?;

  let (total, max_modified): (i64, Option<i64>) = tx.query_row(
    "SELECT COUNT(*), MAX(modified_at) FROM persons",
    [],
    |row| Ok((row.get(0)?, row.get(1)?)),
  )?;

  let raws: Vec<RawPerson> = {
    let mut stmt = tx.prepare(&format!(
      "SELECT {PERSON_COLUMNS} FROM persons ORDER BY email ASC LIMIT ?1 OFFSET ?2"
    ))?;
    stmt
      .query_map(
        rusqlite::params![
          i64::from(window.limit),
          i64::try_from(window.offset).unwrap_or(i64::MAX),
        ],
        RawPerson::from_row,
      )?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let mut items = Vec::with_capacity(raws.len());
  for raw in raws {
    let contacts = fetch_contacts(&tx, &raw.id)?;
    items.push(raw.into_person(contacts)?);
  }

  tx.commit()?;

  Ok(PersonPage {
    window,
    total: u64::try_from(total).unwrap_or_default(),
    max_modified_at: max_modified.map(decode_dt).transpose()?,
    items,
  })
}

// ─── Statement helpers ───────────────────────────────────────────────────────

fn person_exists(conn: &rusqlite::Connection, id_str: &str) -> Result<bool> {
  let mut stmt = conn.prepare_cached("SELECT 1 FROM persons WHERE id = ?1")?;
  Ok(stmt.exists(rusqlite::params![id_str])?)
}

fn fetch_person(conn: &rusqlite::Connection, id_str: &str) -> Result<Option<Person>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
      rusqlite::params![id_str],
      RawPerson::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let contacts = fetch_contacts(conn, id_str)?;
      Ok(Some(raw.into_person(contacts)?))
    }
    None => Ok(None),
  }
}

/// Resolve a person's outgoing links against the current contact rows.
fn fetch_contacts(conn: &rusqlite::Connection, id_str: &str) -> Result<Vec<ContactSummary>> {
  let mut stmt = conn.prepare_cached(
    "SELECT p.id, p.name, p.surname, p.email
       FROM contact_links l
       JOIN persons p ON p.id = l.contact_id
      WHERE l.person_id = ?1
      ORDER BY p.email ASC",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![id_str], RawContact::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawContact::into_summary).collect()
}

/// The subset of `ids` with no matching person row, in input order.
fn missing_ids(conn: &rusqlite::Connection, ids: &[Uuid]) -> Result<Vec<Uuid>> {
  let mut missing = Vec::new();
  for id in ids {
    if !person_exists(conn, &encode_uuid(*id))? {
      missing.push(*id);
    }
  }
  Ok(missing)
}

fn insert_links(conn: &rusqlite::Connection, person_id: Uuid, contacts: &[Uuid]) -> Result<()> {
  let person_str = encode_uuid(person_id);
  let mut stmt = conn
    .prepare_cached("INSERT INTO contact_links (person_id, contact_id) VALUES (?1, ?2)")?;

  for contact in contacts {
    stmt
      .execute(rusqlite::params![person_str, encode_uuid(*contact)])
      .map_err(|e| match violation(&e) {
        Some(Violation::ForeignKey) => Error::UnknownContacts(vec![*contact]),
        Some(Violation::SelfContact) => Error::SelfContact(person_id),
        _ => Error::Sqlite(e),
      })?;
  }
  Ok(())
}

/// Build `UPDATE persons SET ... WHERE id = ?N` for the present fields only.
fn scalar_update(update: &PersonUpdate, id_str: &str) -> (String, Vec<Value>) {
  let text = |s: &str| Value::Text(s.to_owned());

  let mut columns: Vec<&'static str> = Vec::new();
  let mut values: Vec<Value> = Vec::new();
  let mut set = |column, value| {
    columns.push(column);
    values.push(value);
  };

  if let Some(name) = &update.name {
    set("name", text(name));
  }
  if let Some(surname) = &update.surname {
    set("surname", text(surname));
  }
  if let Some(gender) = update.gender {
    set("gender", gender.map(encode_gender).map_or(Value::Null, text));
  }
  if let Some(birthday) = update.birthday {
    set("birthday", birthday.map_or(Value::Null, |d| Value::Text(encode_date(d))));
  }
  if let Some(phone) = &update.phone {
    set("phone", phone.as_deref().map_or(Value::Null, text));
  }
  if let Some(email) = &update.email {
    set("email", text(email));
  }

  let assignments = columns
    .iter()
    .enumerate()
    .map(|(i, column)| format!("{column} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!("UPDATE persons SET {assignments} WHERE id = ?{}", columns.len() + 1);

  values.push(text(id_str));
  (sql, values)
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
  let mut seen = HashSet::new();
  ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

// ─── Constraint classification ───────────────────────────────────────────────

enum Violation {
  Unique,
  ForeignKey,
  SelfContact,
  Check(String),
}

fn violation(err: &rusqlite::Error) -> Option<Violation> {
  let rusqlite::Error::SqliteFailure(failure, message) = err else {
    return None;
  };
  if failure.code != ErrorCode::ConstraintViolation {
    return None;
  }
  let message = message.clone().unwrap_or_default();
  match failure.extended_code {
    ffi::SQLITE_CONSTRAINT_UNIQUE => Some(Violation::Unique),
    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
    ffi::SQLITE_CONSTRAINT_CHECK if message.contains(NO_SELF_CONTACT) => {
      Some(Violation::SelfContact)
    }
    ffi::SQLITE_CONSTRAINT_CHECK | ffi::SQLITE_CONSTRAINT_NOTNULL => {
      Some(Violation::Check(message))
    }
    _ => None,
  }
}

/// Map a failed INSERT/UPDATE on `persons`.
fn row_write_error(err: rusqlite::Error, email: &str) -> Error {
  match violation(&err) {
    Some(Violation::Unique) => Error::EmailTaken(email.to_owned()),
    Some(Violation::Check(message)) => Error::Constraint(message),
    _ => Error::Sqlite(err),
  }
}
