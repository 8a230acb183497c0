use rolodex_core::{directory::Directory, store::PersonStore};

use crate::{
  document::{Document, PersonVars},
  error::Error,
  response::Answer,
};

pub async fn handle<S: PersonStore>(
  directory: &Directory<S>,
  doc: &Document,
) -> Result<Answer, Error> {
  let vars: PersonVars = doc.variables()?;
  let fetched = directory.get(&vars.id, vars.if_none_match.as_deref()).await?;
  Answer::fetched("person", fetched)
}
