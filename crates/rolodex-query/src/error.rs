//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure travels in the `errors` array of an HTTP 200 response; the
//! category is carried in `extensions.code`.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  response::{IntoResponse, Response},
};
use rolodex_core::ErrorKind;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Engine(#[from] rolodex_core::Error),
  #[error("malformed query document: {0}")]
  BadDocument(String),
  #[error("unknown operation: {0:?}")]
  UnknownOperation(String),
  #[error("response encoding failed: {0}")]
  Encode(#[from] serde_json::Error),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Engine(e) => e.kind(),
      Error::BadDocument(_) | Error::UnknownOperation(_) => ErrorKind::Validation,
      Error::Encode(_) => ErrorKind::Internal,
    }
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self { Error::BadDocument(rejection.body_text()) }
}

/// One entry of the `errors` array.
#[derive(Debug, Serialize)]
pub struct ErrorEntry {
  pub message:    String,
  pub extensions: ErrorExtensions,
}

#[derive(Debug, Serialize)]
pub struct ErrorExtensions {
  pub code: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
  data:   Option<()>,
  errors: Vec<ErrorEntry>,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let kind = self.kind();
    if kind == ErrorKind::Internal {
      tracing::error!(error = %self, "query failed");
    }
    Json(ErrorEnvelope {
      data:   None,
      errors: vec![ErrorEntry {
        message:    self.to_string(),
        extensions: ErrorExtensions { code: kind.code() },
      }],
    })
    .into_response()
  }
}
