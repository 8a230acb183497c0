use rolodex_core::{directory::Directory, store::PersonStore};
use serde_json::Value;

use crate::{
  document::{DeleteVars, Document},
  error::Error,
  response::Answer,
};

/// Answers `true`; a missing person surfaces as a `NOT_FOUND` error.
pub async fn handle<S: PersonStore>(
  directory: &Directory<S>,
  doc: &Document,
) -> Result<Answer, Error> {
  let DeleteVars { id } = doc.variables()?;
  directory.delete(&id).await?;
  Ok(Answer::plain("deletePerson", Value::Bool(true)))
}
