use rolodex_core::{directory::Directory, store::PersonStore};

use crate::{
  document::{Document, PeopleVars},
  error::Error,
  response::Answer,
};

pub async fn handle<S: PersonStore>(
  directory: &Directory<S>,
  doc: &Document,
) -> Result<Answer, Error> {
  let vars: PeopleVars = doc.variables()?;
  let fetched = directory
    .list(vars.limit, vars.offset, vars.if_none_match.as_deref())
    .await?;
  Answer::fetched("people", fetched)
}
