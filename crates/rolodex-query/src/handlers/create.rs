use rolodex_core::{directory::Directory, store::PersonStore};

use crate::{
  document::{CreateVars, Document},
  error::Error,
  response::Answer,
};

pub async fn handle<S: PersonStore>(
  directory: &Directory<S>,
  doc: &Document,
) -> Result<Answer, Error> {
  let CreateVars { input } = doc.variables()?;
  Answer::tagged("createPerson", directory.create(input).await?)
}
