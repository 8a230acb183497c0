//! The engine both protocol surfaces call.
//!
//! [`Directory`] wraps a [`PersonStore`] and owns everything that must behave
//! the same regardless of protocol: identifier parsing, input validation,
//! pagination bounds, error classification, age derivation and ETags.
//! Surfaces only translate their wire format into these calls and the results
//! back out.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  age::{Clock, SystemClock},
  error::ErrorKind,
  etag::{etag_matches, page_etag, person_etag},
  person::{NewPerson, PageWindow, PersonPatch},
  store::PersonStore,
  view::{PageView, PersonView},
};

/// Outcome of a conditional read.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
  /// The presented ETag no longer matches (or none was presented).
  Modified { body: T, etag: String },
  /// The presented ETag still matches; the body is withheld.
  NotModified { etag: String },
}

impl<T> Fetched<T> {
  pub fn etag(&self) -> &str {
    match self {
      Fetched::Modified { etag, .. } | Fetched::NotModified { etag } => etag,
    }
  }

  fn resolve(body: T, etag: String, if_none_match: Option<&str>) -> Self {
    match if_none_match {
      Some(presented) if etag_matches(presented, &etag) => Fetched::NotModified { etag },
      _ => Fetched::Modified { body, etag },
    }
  }
}

/// A freshly written body with its new ETag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged<T> {
  pub body: T,
  pub etag: String,
}

pub struct Directory<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
}

impl<S> Clone for Directory<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), clock: Arc::clone(&self.clock) }
  }
}

impl<S: PersonStore> Directory<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_clock(store, Arc::new(SystemClock)) }

  pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self { Self { store, clock } }

  pub fn store(&self) -> &S { &self.store }

  /// Parse an opaque person identifier. Malformed input is a validation
  /// error, distinct from an id that parses but does not exist.
  pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::MalformedId(raw.to_owned()))
  }

  fn view(&self, person: crate::person::Person) -> Tagged<PersonView> {
    let etag = person_etag(person.modified_at);
    Tagged { body: PersonView::derive(person, self.clock.today()), etag }
  }

  pub async fn create(&self, input: NewPerson) -> Result<Tagged<PersonView>> {
    let input = input.validate()?;
    let person = self.store.create_person(input).await.map_err(classify)?;
    tracing::info!(person_id = %person.id, contacts = person.contacts.len(), "created person");
    Ok(self.view(person))
  }

  pub async fn get(
    &self,
    id: &str,
    if_none_match: Option<&str>,
  ) -> Result<Fetched<PersonView>> {
    let id = Self::parse_id(id)?;
    let person = self
      .store
      .get_person(id)
      .await
      .map_err(classify)?
      .ok_or(Error::PersonNotFound(id))?;
    tracing::debug!(person_id = %id, "fetched person");
    let Tagged { body, etag } = self.view(person);
    Ok(Fetched::resolve(body, etag, if_none_match))
  }

  pub async fn update(&self, id: &str, patch: PersonPatch) -> Result<Tagged<PersonView>> {
    let id = Self::parse_id(id)?;
    let update = patch.validate()?;
    let person = self
      .store
      .update_person(id, update)
      .await
      .map_err(classify)?
      .ok_or(Error::PersonNotFound(id))?;
    tracing::info!(person_id = %id, contacts = person.contacts.len(), "updated person");
    Ok(self.view(person))
  }

  pub async fn delete(&self, id: &str) -> Result<()> {
    let id = Self::parse_id(id)?;
    if !self.store.delete_person(id).await.map_err(classify)? {
      return Err(Error::PersonNotFound(id));
    }
    tracing::info!(person_id = %id, "deleted person");
    Ok(())
  }

  pub async fn list(
    &self,
    limit: Option<i64>,
    offset: Option<i64>,
    if_none_match: Option<&str>,
  ) -> Result<Fetched<PageView>> {
    let window = PageWindow::new(limit, offset)?;
    let page = self.store.list_people(window).await.map_err(classify)?;
    let etag = page_etag(page.window, page.total, page.max_modified_at);
    tracing::debug!(
      limit = window.limit,
      offset = window.offset,
      total = page.total,
      "listed people"
    );
    let body = PageView::derive(page, self.clock.today());
    Ok(Fetched::resolve(body, etag, if_none_match))
  }
}

/// Convert a backend error into the engine taxonomy, logging anything the
/// caller cannot act on.
fn classify<E: Into<Error>>(err: E) -> Error {
  let err = err.into();
  if err.kind() == ErrorKind::Internal {
    tracing::warn!(error = %err, "store failure");
  }
  err
}

#[cfg(test)]
mod tests {
  use std::{collections::BTreeMap, sync::Mutex};

  use chrono::{NaiveDate, TimeZone, Utc};

  use super::*;
  use crate::{
    age::FixedClock,
    person::{Person, PersonPage, PersonUpdate},
  };

  /// Minimal in-memory store: no contacts, no uniqueness.
  #[derive(Default)]
  struct MemStore {
    rows: Mutex<BTreeMap<Uuid, Person>>,
    tick: Mutex<i64>,
  }

  #[derive(Debug, thiserror::Error)]
  enum MemError {
    #[error("mem store")]
    Broken,
    #[error("self contact {0}")]
    SelfContact(Uuid),
  }

  impl From<MemError> for Error {
    fn from(e: MemError) -> Self {
      match e {
        MemError::SelfContact(id) => Error::SelfContact(id),
        other => Error::Store(Box::new(other)),
      }
    }
  }

  impl MemStore {
    fn next_ts(&self) -> chrono::DateTime<Utc> {
      let mut t = self.tick.lock().unwrap();
      *t += 1;
      Utc.timestamp_micros(*t).unwrap()
    }
  }

  impl PersonStore for MemStore {
    type Error = MemError;

    async fn create_person(&self, input: NewPerson) -> Result<Person, MemError> {
      let ts = self.next_ts();
      let person = Person {
        id:          Uuid::new_v4(),
        name:        input.name,
        surname:     input.surname,
        gender:      input.gender,
        birthday:    input.birthday,
        phone:       input.phone,
        email:       input.email,
        created_at:  ts,
        modified_at: ts,
        contacts:    vec![],
      };
      self.rows.lock().unwrap().insert(person.id, person.clone());
      Ok(person)
    }

    async fn get_person(&self, id: Uuid) -> Result<Option<Person>, MemError> {
      Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update_person(
      &self,
      id: Uuid,
      update: PersonUpdate,
    ) -> Result<Option<Person>, MemError> {
      let ts = self.next_ts();
      let mut rows = self.rows.lock().unwrap();
      let Some(p) = rows.get_mut(&id) else { return Ok(None) };
      if update.contacts.as_ref().is_some_and(|ids| ids.contains(&id)) {
        return Err(MemError::SelfContact(id));
      }
      if let Some(name) = update.name {
        p.name = name;
      }
      p.modified_at = ts;
      Ok(Some(p.clone()))
    }

    async fn delete_person(&self, id: Uuid) -> Result<bool, MemError> {
      Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn list_people(&self, window: PageWindow) -> Result<PersonPage, MemError> {
      if window.offset > 1_000 {
        return Err(MemError::Broken);
      }
      let rows = self.rows.lock().unwrap();
      let mut items: Vec<Person> = rows.values().cloned().collect();
      items.sort_by(|a, b| a.email.cmp(&b.email));
      Ok(PersonPage {
        window,
        total: items.len() as u64,
        max_modified_at: items.iter().map(|p| p.modified_at).max(),
        items: items
          .into_iter()
          .skip(window.offset as usize)
          .take(window.limit as usize)
          .collect(),
      })
    }
  }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() }

  fn directory() -> Directory<MemStore> {
    Directory::with_clock(Arc::new(MemStore::default()), Arc::new(FixedClock(today())))
  }

  fn alice() -> NewPerson {
    serde_json::from_value(serde_json::json!({
      "name": "Alice",
      "surname": "Liddell",
      "email": "alice@example.com",
      "birthday": "2014-06-16",
    }))
    .unwrap()
  }

  #[tokio::test]
  async fn create_derives_age_from_clock() {
    let dir = directory();
    let created = dir.create(alice()).await.unwrap();
    assert_eq!(created.body.age, Some(9));
    assert_eq!(created.etag, person_etag(created.body.modified_at));
  }

  #[tokio::test]
  async fn malformed_id_is_validation_not_not_found() {
    let dir = directory();
    let err = dir.get("not-a-uuid", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = dir.get(&Uuid::new_v4().to_string(), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn matching_etag_yields_not_modified() {
    let dir = directory();
    let created = dir.create(alice()).await.unwrap();
    let id = created.body.id.to_string();

    let fetched = dir.get(&id, Some(&created.etag)).await.unwrap();
    assert_eq!(fetched, Fetched::NotModified { etag: created.etag.clone() });

    let fetched = dir.get(&id, Some("\"stale\"")).await.unwrap();
    assert!(matches!(fetched, Fetched::Modified { .. }));
  }

  #[tokio::test]
  async fn update_invalidates_person_etag() {
    let dir = directory();
    let created = dir.create(alice()).await.unwrap();
    let id = created.body.id.to_string();

    let patch: PersonPatch = serde_json::from_str(r#"{"name":"Alicia"}"#).unwrap();
    let updated = dir.update(&id, patch).await.unwrap();
    assert_eq!(updated.body.name, "Alicia");
    assert_ne!(updated.etag, created.etag);

    let fetched = dir.get(&id, Some(&created.etag)).await.unwrap();
    assert!(matches!(fetched, Fetched::Modified { .. }));
  }

  #[tokio::test]
  async fn own_id_in_contacts_is_validation() {
    let dir = directory();
    let created = dir.create(alice()).await.unwrap();
    let id = created.body.id;

    let patch: PersonPatch =
      serde_json::from_value(serde_json::json!({ "contacts": [id] })).unwrap();
    let err = dir.update(&id.to_string(), patch).await.unwrap_err();
    assert!(matches!(err, Error::SelfContact(x) if x == id));
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[tokio::test]
  async fn absent_id_naming_itself_is_not_found() {
    let dir = directory();
    let id = Uuid::new_v4();
    let patch: PersonPatch =
      serde_json::from_value(serde_json::json!({ "contacts": [id] })).unwrap();
    let err = dir.update(&id.to_string(), patch).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn delete_missing_is_not_found() {
    let dir = directory();
    let err = dir.delete(&Uuid::new_v4().to_string()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn list_rejects_out_of_range_limit() {
    let dir = directory();
    let err = dir.list(Some(0), None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = dir.list(Some(101), None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[tokio::test]
  async fn page_etag_changes_after_any_write() {
    let dir = directory();
    dir.create(alice()).await.unwrap();
    let first = dir.list(None, None, None).await.unwrap();

    let again = dir.list(None, None, Some(first.etag())).await.unwrap();
    assert!(matches!(again, Fetched::NotModified { .. }));

    let mut bob = alice();
    bob.email = "bob@example.com".into();
    dir.create(bob).await.unwrap();

    let after = dir.list(None, None, Some(first.etag())).await.unwrap();
    assert!(matches!(after, Fetched::Modified { ref body, .. } if body.total == 2));
  }

  #[tokio::test]
  async fn store_failures_surface_as_internal() {
    let dir = directory();
    let err = dir.list(None, Some(5_000), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
  }
}
