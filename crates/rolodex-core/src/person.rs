//! The person entity and the inputs that create and change it.
//!
//! A person owns a directed set of contact links to other persons. The links
//! are never copied into the person: every read resolves them against the
//! current rows, so [`ContactSummary`] values are always live.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Stored shape ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

/// A person together with its live-resolved contact list: the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
  pub id:          Uuid,
  pub name:        String,
  pub surname:     String,
  pub gender:      Option<Gender>,
  pub birthday:    Option<NaiveDate>,
  pub phone:       Option<String>,
  pub email:       String,
  pub created_at:  DateTime<Utc>,
  /// Maintained by the storage layer; advances on every mutation of the
  /// scalar row or of its outgoing contact set.
  pub modified_at: DateTime<Utc>,
  /// Ordered ascending by contact email.
  pub contacts:    Vec<ContactSummary>,
}

/// The resolved view of a linked contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSummary {
  pub id:      Uuid,
  pub name:    String,
  pub surname: String,
  pub email:   String,
}

// ─── Create input ────────────────────────────────────────────────────────────

/// Fields accepted when creating a person. `age`, `id` and the timestamps are
/// system-managed and rejected if supplied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPerson {
  pub name:     String,
  pub surname:  String,
  #[serde(default)]
  pub gender:   Option<Gender>,
  #[serde(default)]
  pub birthday: Option<NaiveDate>,
  #[serde(default)]
  pub phone:    Option<String>,
  pub email:    String,
  /// Initial outgoing contact set.
  #[serde(default)]
  pub contacts: Vec<Uuid>,
}

impl NewPerson {
  pub fn validate(self) -> Result<Self> {
    require_text("name", &self.name)?;
    require_text("surname", &self.surname)?;
    require_email(&self.email)?;
    Ok(self)
  }
}

// ─── Partial update ──────────────────────────────────────────────────────────

/// A partial update as it arrives from a caller.
///
/// The outer `Option` records whether the key was present at all; the inner
/// one whether it was `null`. Absent keys leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonPatch {
  #[serde(default, deserialize_with = "present")]
  pub name:     Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub surname:  Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub gender:   Option<Option<Gender>>,
  #[serde(default, deserialize_with = "present")]
  pub birthday: Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "present")]
  pub phone:    Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub email:    Option<Option<String>>,
  /// When present (even empty) the outgoing contact set is replaced wholesale.
  #[serde(default, deserialize_with = "present")]
  pub contacts: Option<Option<Vec<Uuid>>>,
}

/// Distinguishes a key set to `null` from a key that was never sent.
fn present<'de, T, D>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

impl PersonPatch {
  /// Check the patch and turn it into the shape the store applies.
  pub fn validate(self) -> Result<PersonUpdate> {
    let name = required("name", self.name)?;
    let surname = required("surname", self.surname)?;
    let email = required("email", self.email)?;

    if let Some(n) = &name {
      require_text("name", n)?;
    }
    if let Some(s) = &surname {
      require_text("surname", s)?;
    }
    if let Some(e) = &email {
      require_email(e)?;
    }

    let contacts = match self.contacts {
      None => None,
      Some(None) => {
        return Err(Error::Validation(
          "contacts cannot be null; send [] to clear".to_owned(),
        ));
      }
      Some(Some(ids)) => Some(ids),
    };

    Ok(PersonUpdate {
      name,
      surname,
      gender: self.gender,
      birthday: self.birthday,
      phone: self.phone,
      email,
      contacts,
    })
  }
}

/// A validated partial update, as applied by [`PersonStore::update_person`].
///
/// [`PersonStore::update_person`]: crate::store::PersonStore::update_person
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonUpdate {
  pub name:     Option<String>,
  pub surname:  Option<String>,
  pub gender:   Option<Option<Gender>>,
  pub birthday: Option<Option<NaiveDate>>,
  pub phone:    Option<Option<String>>,
  pub email:    Option<String>,
  pub contacts: Option<Vec<Uuid>>,
}

impl PersonUpdate {
  /// Whether any column of the `persons` row is touched.
  pub fn changes_scalars(&self) -> bool {
    self.name.is_some()
      || self.surname.is_some()
      || self.gender.is_some()
      || self.birthday.is_some()
      || self.phone.is_some()
      || self.email.is_some()
  }

  pub fn is_empty(&self) -> bool {
    !self.changes_scalars() && self.contacts.is_none()
  }
}

fn required(field: &str, value: Option<Option<String>>) -> Result<Option<String>> {
  match value {
    Some(None) => Err(Error::Validation(format!("{field} cannot be null"))),
    Some(Some(v)) => Ok(Some(v)),
    None => Ok(None),
  }
}

fn require_text(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} must not be empty")));
  }
  Ok(())
}

fn require_email(value: &str) -> Result<()> {
  require_text("email", value)?;
  if !value.contains('@') {
    return Err(Error::Validation(format!("email {value:?} is missing '@'")));
  }
  Ok(())
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// A validated `limit`/`offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
  pub limit:  u32,
  pub offset: u64,
}

impl PageWindow {
  pub const DEFAULT_LIMIT: u32 = 20;
  pub const MAX_LIMIT: u32 = 100;
  pub const MIN_LIMIT: u32 = 1;

  /// Apply defaults and bounds. Out-of-range values are rejected, not
  /// clamped.
  pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self> {
    let limit = match limit {
      None => Self::DEFAULT_LIMIT,
      Some(l) if (i64::from(Self::MIN_LIMIT)..=i64::from(Self::MAX_LIMIT)).contains(&l) => {
        l as u32
      }
      Some(got) => {
        return Err(Error::LimitOutOfRange {
          min: Self::MIN_LIMIT,
          max: Self::MAX_LIMIT,
          got,
        });
      }
    };
    let offset = match offset {
      None => 0,
      Some(o) if o >= 0 => o as u64,
      Some(o) => return Err(Error::NegativeOffset(o)),
    };
    Ok(Self { limit, offset })
  }
}

impl Default for PageWindow {
  fn default() -> Self {
    Self { limit: Self::DEFAULT_LIMIT, offset: 0 }
  }
}

/// One page of persons plus the table-wide figures the page fingerprint is
/// built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPage {
  pub window:          PageWindow,
  /// Row count of the whole table, independent of the window.
  pub total:           u64,
  /// Latest `modified_at` across the whole table; `None` when empty.
  pub max_modified_at: Option<DateTime<Utc>>,
  /// Ordered ascending by email.
  pub items:           Vec<Person>,
}
