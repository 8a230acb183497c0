//! The success envelope: `{"data": {<key>: ...}, "extensions": {...}}`.

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use rolodex_core::directory::{Fetched, Tagged};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
  pub etag:         String,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub not_modified: bool,
}

/// The result of one successfully executed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
  pub key:        &'static str,
  pub data:       Value,
  pub extensions: Option<Extensions>,
}

impl Answer {
  pub fn plain(key: &'static str, data: Value) -> Self {
    Self { key, data, extensions: None }
  }

  pub fn tagged<T: Serialize>(key: &'static str, tagged: Tagged<T>) -> Result<Self, Error> {
    Ok(Self {
      key,
      data: serde_json::to_value(tagged.body)?,
      extensions: Some(Extensions { etag: tagged.etag, not_modified: false }),
    })
  }

  /// A fingerprint match yields `null` data and `notModified: true`.
  pub fn fetched<T: Serialize>(key: &'static str, fetched: Fetched<T>) -> Result<Self, Error> {
    match fetched {
      Fetched::Modified { body, etag } => Self::tagged(key, Tagged { body, etag }),
      Fetched::NotModified { etag } => Ok(Self {
        key,
        data: Value::Null,
        extensions: Some(Extensions { etag, not_modified: true }),
      }),
    }
  }
}

#[derive(Serialize)]
struct Envelope {
  data:       Map<String, Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  extensions: Option<Extensions>,
}

impl IntoResponse for Answer {
  fn into_response(self) -> Response {
    let mut data = Map::new();
    data.insert(self.key.to_string(), self.data);
    Json(Envelope { data, extensions: self.extensions }).into_response()
  }
}
