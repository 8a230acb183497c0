//! Error types for `rolodex-core`.
//!
//! Every failure the engine reports falls into one of the [`ErrorKind`]
//! categories. Protocol surfaces map the kind onto their own conventions and
//! never inspect the variant directly.

use thiserror::Error;
use uuid::Uuid;

/// The taxonomy shared by both protocol surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed input shape, out-of-range pagination, malformed identifier.
  Validation,
  /// One or more contact ids do not resolve to an existing person.
  Referential,
  /// Email uniqueness violation.
  Conflict,
  /// The identifier does not resolve to a live row.
  NotFound,
  /// Anything the caller cannot fix.
  Internal,
}

impl ErrorKind {
  /// Stable machine-readable code, identical on every surface.
  pub fn code(self) -> &'static str {
    match self {
      ErrorKind::Validation => "VALIDATION",
      ErrorKind::Referential => "REFERENTIAL",
      ErrorKind::Conflict => "CONFLICT",
      ErrorKind::NotFound => "NOT_FOUND",
      ErrorKind::Internal => "INTERNAL",
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("malformed person id: {0:?}")]
  MalformedId(String),

  #[error("limit must be between {min} and {max}, got {got}")]
  LimitOutOfRange { min: u32, max: u32, got: i64 },

  #[error("offset must not be negative, got {0}")]
  NegativeOffset(i64),

  #[error("a person cannot list itself as a contact: {0}")]
  SelfContact(Uuid),

  #[error("unknown contact ids: {}", join_ids(.0))]
  UnknownContacts(Vec<Uuid>),

  #[error("email already in use: {0}")]
  EmailTaken(String),

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Validation(_)
      | Error::MalformedId(_)
      | Error::LimitOutOfRange { .. }
      | Error::NegativeOffset(_)
      | Error::SelfContact(_) => ErrorKind::Validation,
      Error::UnknownContacts(_) => ErrorKind::Referential,
      Error::EmailTaken(_) => ErrorKind::Conflict,
      Error::PersonNotFound(_) => ErrorKind::NotFound,
      Error::Store(_) => ErrorKind::Internal,
    }
  }
}

fn join_ids(ids: &[Uuid]) -> String {
  ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
