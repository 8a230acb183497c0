//! Typed query/mutation surface for Rolodex.
//!
//! A single `POST /query` endpoint accepts a [`Document`] naming one
//! operation and its variables, and answers with a `data`/`errors` envelope.
//! The transport status is always 200; failures are reported in `errors`
//! with their category in `extensions.code`.
//!
//! | Operation      | Variables                          | `data` key     |
//! |----------------|------------------------------------|----------------|
//! | `person`       | `id`, `ifNoneMatch?`               | `person`       |
//! | `people`       | `limit?`, `offset?`, `ifNoneMatch?`| `people`       |
//! | `createPerson` | `input`                            | `createPerson` |
//! | `updatePerson` | `id`, `input`                      | `updatePerson` |
//! | `deletePerson` | `id`                               | `deletePerson` |

pub mod document;
pub mod error;
pub mod handlers;
pub mod response;

pub use document::Document;
pub use error::Error;
pub use response::Answer;

use axum::{
  Json,
  Router,
  extract::{State, rejection::JsonRejection},
  response::{IntoResponse, Response},
  routing::post,
};
use rolodex_core::{directory::Directory, store::PersonStore};

use handlers::{create, delete, people, person, update};

/// Build the `/query` router for `directory`.
pub fn query_router<S>(directory: Directory<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new()
    .route("/query", post(execute::<S>))
    .with_state(directory)
}

async fn execute<S>(
  State(directory): State<Directory<S>>,
  body: Result<Json<Document>, JsonRejection>,
) -> Response
where
  S: PersonStore + 'static,
{
  let doc = match body {
    Ok(Json(doc)) => doc,
    Err(rejection) => return Error::from(rejection).into_response(),
  };
  run(&directory, &doc).await.into_response()
}

/// Execute one document against `directory`.
pub async fn run<S: PersonStore>(
  directory: &Directory<S>,
  doc: &Document,
) -> Result<Answer, Error> {
  tracing::debug!(operation = %doc.operation, "executing query document");
  match doc.operation.as_str() {
    "person" => person::handle(directory, doc).await,
    "people" => people::handle(directory, doc).await,
    "createPerson" => create::handle(directory, doc).await,
    "updatePerson" => update::handle(directory, doc).await,
    "deletePerson" => delete::handle(directory, doc).await,
    other => Err(Error::UnknownOperation(other.to_string())),
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
