//! Error type for `rolodex-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("column decode error: {0}")]
  Decode(String),

  /// Contact ids that do not reference an existing person.
  #[error("unknown contact ids: {0:?}")]
  UnknownContacts(Vec<Uuid>),

  /// The unique constraint on `persons.email` fired.
  #[error("email already in use: {0}")]
  EmailTaken(String),

  #[error("a person cannot list itself as a contact: {0}")]
  SelfContact(Uuid),

  /// A CHECK constraint other than the self-contact rule fired.
  #[error("constraint violated: {0}")]
  Constraint(String),
}

impl From<Error> for rolodex_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::UnknownContacts(ids) => rolodex_core::Error::UnknownContacts(ids),
      Error::EmailTaken(email) => rolodex_core::Error::EmailTaken(email),
      Error::SelfContact(id) => rolodex_core::Error::SelfContact(id),
      Error::Constraint(msg) => rolodex_core::Error::Validation(msg),
      other => rolodex_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
