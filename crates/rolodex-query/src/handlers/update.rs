use rolodex_core::{directory::Directory, store::PersonStore};

use crate::{
  document::{Document, UpdateVars},
  error::Error,
  response::Answer,
};

pub async fn handle<S: PersonStore>(
  directory: &Directory<S>,
  doc: &Document,
) -> Result<Answer, Error> {
  let UpdateVars { id, input } = doc.variables()?;
  Answer::tagged("updatePerson", directory.update(&id, input).await?)
}
