//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are integer microseconds since the Unix epoch. Birthdays are
//! `YYYY-MM-DD` text. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use rolodex_core::person::{ContactSummary, Gender, Person};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> i64 { dt.timestamp_micros() }

pub fn decode_dt(micros: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_micros(micros)
    .ok_or_else(|| Error::Decode(format!("timestamp out of range: {micros}")))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("bad birthday {s:?}: {e}")))
}

// ─── Gender ───────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Gender) -> &'static str {
  match g {
    Gender::Male => "male",
    Gender::Female => "female",
  }
}

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "male" => Ok(Gender::Male),
    "female" => Ok(Gender::Female),
    other => Err(Error::Decode(format!("unknown gender: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`].
pub const PERSON_COLUMNS: &str =
  "id, name, surname, gender, birthday, phone, email, created_at, modified_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:          String,
  pub name:        String,
  pub surname:     String,
  pub gender:      Option<String>,
  pub birthday:    Option<String>,
  pub phone:       Option<String>,
  pub email:       String,
  pub created_at:  i64,
  pub modified_at: i64,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      surname:     row.get(2)?,
      gender:      row.get(3)?,
      birthday:    row.get(4)?,
      phone:       row.get(5)?,
      email:       row.get(6)?,
      created_at:  row.get(7)?,
      modified_at: row.get(8)?,
    })
  }

  pub fn into_person(self, contacts: Vec<ContactSummary>) -> Result<Person> {
    Ok(Person {
      id: decode_uuid(&self.id)?,
      name: self.name,
      surname: self.surname,
      gender: self.gender.as_deref().map(decode_gender).transpose()?,
      birthday: self.birthday.as_deref().map(decode_date).transpose()?,
      phone: self.phone,
      email: self.email,
      created_at: decode_dt(self.created_at)?,
      modified_at: decode_dt(self.modified_at)?,
      contacts,
    })
  }
}

/// Raw values for one resolved contact.
pub struct RawContact {
  pub id:      String,
  pub name:    String,
  pub surname: String,
  pub email:   String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      name:    row.get(1)?,
      surname: row.get(2)?,
      email:   row.get(3)?,
    })
  }

  pub fn into_summary(self) -> Result<ContactSummary> {
    Ok(ContactSummary {
      id:      decode_uuid(&self.id)?,
      name:    self.name,
      surname: self.surname,
      email:   self.email,
    })
  }
}
