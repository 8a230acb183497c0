//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | `?limit` (1–100, default 20), `?offset` (default 0); `If-None-Match` → 304 |
//! | `POST`   | `/people` | Body: person fields + optional `contacts`; returns 201 |
//! | `GET`    | `/people/:id` | `If-None-Match` → 304 |
//! | `PATCH`  | `/people/:id` | Absent keys untouched, `null` clears, `contacts` replaces |
//! | `DELETE` | `/people/:id` | 204 |

use axum::{
  Json,
  extract::{OriginalUri, Path, Query, State, rejection::{JsonRejection, QueryRejection}},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use rolodex_core::{
  directory::{Directory, Fetched, Tagged},
  person::{NewPerson, PersonPatch},
  store::PersonStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

fn if_none_match(headers: &HeaderMap) -> Option<&str> {
  headers.get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok())
}

fn conditional<T: Serialize>(fetched: Fetched<T>) -> Response {
  match fetched {
    Fetched::Modified { body, etag } => {
      (StatusCode::OK, [(header::ETAG, etag)], Json(body)).into_response()
    }
    Fetched::NotModified { etag } => {
      (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response()
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit:  Option<i64>,
  pub offset: Option<i64>,
}

/// `GET /people[?limit=..][&offset=..]`
pub async fn list<S>(
  State(directory): State<Directory<S>>,
  headers: HeaderMap,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError>
where
  S: PersonStore + 'static,
{
  let Query(params) = params?;
  let page = directory
    .list(params.limit, params.offset, if_none_match(&headers))
    .await?;
  Ok(conditional(page))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/:id`
pub async fn get_one<S>(
  State(directory): State<Directory<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: PersonStore + 'static,
{
  let person = directory.get(&id, if_none_match(&headers)).await?;
  Ok(conditional(person))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /people`, answered with 201 plus `Location` and `ETag`.
pub async fn create<S>(
  State(directory): State<Directory<S>>,
  OriginalUri(uri): OriginalUri,
  body: Result<Json<NewPerson>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: PersonStore + 'static,
{
  let Json(input) = body?;
  let Tagged { body, etag } = directory.create(input).await?;
  let location = format!("{}/{}", uri.path().trim_end_matches('/'), body.id);
  Ok(
    (
      StatusCode::CREATED,
      [(header::ETAG, etag), (header::LOCATION, location)],
      Json(body),
    )
      .into_response(),
  )
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /people/:id`
pub async fn update<S>(
  State(directory): State<Directory<S>>,
  Path(id): Path<String>,
  body: Result<Json<PersonPatch>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: PersonStore + 'static,
{
  let Json(patch) = body?;
  let Tagged { body, etag } = directory.update(&id, patch).await?;
  Ok((StatusCode::OK, [(header::ETAG, etag)], Json(body)).into_response())
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /people/:id`
pub async fn delete<S>(
  State(directory): State<Directory<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore + 'static,
{
  directory.delete(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}
