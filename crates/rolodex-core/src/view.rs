//! Read models shared by both protocol surfaces.
//!
//! Both surfaces serialize exactly these types, so field names and the
//! null-versus-absent policy cannot drift between them: every field is always
//! present and optional values are `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  age::age_on,
  person::{ContactSummary, Gender, Person, PersonPage},
};

/// A person as presented to callers, with derived fields filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
  pub id:          Uuid,
  pub name:        String,
  pub surname:     String,
  pub gender:      Option<Gender>,
  pub birthday:    Option<NaiveDate>,
  pub phone:       Option<String>,
  pub email:       String,
  pub age:         Option<u8>,
  pub created_at:  DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
  pub contacts:    Vec<ContactSummary>,
}

impl PersonView {
  pub fn derive(person: Person, today: NaiveDate) -> Self {
    Self {
      age:         age_on(person.birthday, today),
      id:          person.id,
      name:        person.name,
      surname:     person.surname,
      gender:      person.gender,
      birthday:    person.birthday,
      phone:       person.phone,
      email:       person.email,
      created_at:  person.created_at,
      modified_at: person.modified_at,
      contacts:    person.contacts,
    }
  }
}

/// `{total, limit, offset, items}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
  pub total:  u64,
  pub limit:  u32,
  pub offset: u64,
  pub items:  Vec<PersonView>,
}

impl PageView {
  pub fn derive(page: PersonPage, today: NaiveDate) -> Self {
    Self {
      total:  page.total,
      limit:  page.window.limit,
      offset: page.window.offset,
      items:  page
        .items
        .into_iter()
        .map(|p| PersonView::derive(p, today))
        .collect(),
    }
  }
}
