//! The query document and the typed variables of each operation.
//!
//! A document names one operation and carries its variables:
//!
//! ```json
//! { "operation": "updatePerson",
//!   "variables": { "id": "…", "input": { "phone": null, "contacts": [] } } }
//! ```

use rolodex_core::person::{NewPerson, PersonPatch};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::Error;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
  pub operation: String,
  #[serde(default)]
  pub variables: Value,
}

impl Document {
  /// Decode `variables` into the shape `operation` expects. Missing or
  /// `null` variables decode as an empty object.
  pub fn variables<T: DeserializeOwned>(&self) -> Result<T, Error> {
    let vars = match &self.variables {
      Value::Null => Value::Object(Default::default()),
      other => other.clone(),
    };
    serde_json::from_value(vars).map_err(|e| {
      Error::BadDocument(format!("variables for {}: {e}", self.operation))
    })
  }
}

// ─── Reads ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonVars {
  pub id:            String,
  pub if_none_match: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PeopleVars {
  pub limit:         Option<i64>,
  pub offset:        Option<i64>,
  pub if_none_match: Option<String>,
}

// ─── Mutations ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateVars {
  pub input: NewPerson,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateVars {
  pub id:    String,
  pub input: PersonPatch,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteVars {
  pub id: String,
}
