//! Resource-oriented JSON API for Rolodex.
//!
//! Exposes an axum [`Router`] backed by a [`Directory`]. Every handler is a
//! thin translation between HTTP and the directory's operations; nothing here
//! validates, queries or fingerprints on its own.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rolodex_api::api_router(directory.clone()))
//! ```

pub mod error;
pub mod people;

use axum::{Router, routing::get};
use rolodex_core::{directory::Directory, store::PersonStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `directory`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(directory: Directory<S>) -> Router<()>
where
  S: PersonStore + 'static,
{
  Router::new()
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/people/{id}",
      get(people::get_one::<S>)
        .patch(people::update::<S>)
        .delete(people::delete::<S>),
    )
    .with_state(directory)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use chrono::NaiveDate;
  use rolodex_core::age::FixedClock;
  use rolodex_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn make_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    api_router(Directory::with_clock(Arc::new(store), Arc::new(FixedClock(today))))
  }

  async fn send(
    router:  &Router,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn create(router: &Router, body: Value) -> Value {
    let resp = send(router, "POST", "/people", vec![], Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await
  }

  fn alice() -> Value {
    json!({
      "name": "Alice",
      "surname": "Liddell",
      "email": "alice@example.com",
      "birthday": "2014-06-16",
      "gender": "female",
    })
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_location_and_etag() {
    let router = make_router().await;
    let resp = send(&router, "POST", "/people", vec![], Some(alice())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key(header::ETAG));
    let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();

    let body = json_body(resp).await;
    assert_eq!(location, format!("/people/{}", body["id"].as_str().unwrap()));
    assert_eq!(body["age"], 9);
    assert_eq!(body["phone"], Value::Null);
    assert_eq!(body["contacts"], json!([]));
    assert!(body["createdAt"].is_string());
    assert!(body["modifiedAt"].is_string());
  }

  #[tokio::test]
  async fn malformed_body_is_400_json() {
    let router = make_router().await;
    let resp = send(&router, "POST", "/people", vec![], Some(json!({ "name": "A" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION");
  }

  #[tokio::test]
  async fn unknown_contact_is_422() {
    let router = make_router().await;
    let mut input = alice();
    input["contacts"] = json!([Uuid::new_v4()]);
    let resp = send(&router, "POST", "/people", vec![], Some(input)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(resp).await["error"]["code"], "REFERENTIAL");
  }

  #[tokio::test]
  async fn duplicate_email_is_409() {
    let router = make_router().await;
    create(&router, alice()).await;
    let resp = send(&router, "POST", "/people", vec![], Some(alice())).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(resp).await["error"]["code"], "CONFLICT");
  }

  // ── Get ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn malformed_id_is_400_and_unknown_id_is_404() {
    let router = make_router().await;
    let resp = send(&router, "GET", "/people/not-a-uuid", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&router, "GET", &format!("/people/{}", Uuid::new_v4()), vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"]["code"], "NOT_FOUND");
  }

  #[tokio::test]
  async fn if_none_match_returns_304() {
    let router = make_router().await;
    let created = create(&router, alice()).await;
    let uri = format!("/people/{}", created["id"].as_str().unwrap());

    let resp = send(&router, "GET", &uri, vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp.headers()[header::ETAG].to_str().unwrap().to_string();

    let resp = send(&router, "GET", &uri, vec![(header::IF_NONE_MATCH, etag.as_str())], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

    send(&router, "PATCH", &uri, vec![], Some(json!({ "phone": "555" }))).await;
    let resp = send(&router, "GET", &uri, vec![(header::IF_NONE_MATCH, etag.as_str())], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_changes_only_present_fields() {
    let router = make_router().await;
    let created = create(&router, alice()).await;
    let uri = format!("/people/{}", created["id"].as_str().unwrap());

    let resp = send(&router, "PATCH", &uri, vec![], Some(json!({ "gender": null }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["gender"], Value::Null);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["birthday"], "2014-06-16");
  }

  #[tokio::test]
  async fn patch_self_contact_is_400() {
    let router = make_router().await;
    let created = create(&router, alice()).await;
    let id = created["id"].as_str().unwrap();

    let resp = send(
      &router,
      "PATCH",
      &format!("/people/{id}"),
      vec![],
      Some(json!({ "contacts": [id] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn patch_missing_person_is_404() {
    let router = make_router().await;
    let resp = send(
      &router,
      "PATCH",
      &format!("/people/{}", Uuid::new_v4()),
      vec![],
      Some(json!({ "name": "Nobody" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_returns_204_then_404() {
    let router = make_router().await;
    let created = create(&router, alice()).await;
    let uri = format!("/people/{}", created["id"].as_str().unwrap());

    let resp = send(&router, "DELETE", &uri, vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&router, "DELETE", &uri, vec![], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── List ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_defaults_and_envelope() {
    let router = make_router().await;
    create(&router, alice()).await;

    let resp = send(&router, "GET", "/people", vec![], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ETAG));
    let body = json_body(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["items"][0]["email"], "alice@example.com");
  }

  #[tokio::test]
  async fn list_rejects_bad_pagination() {
    let router = make_router().await;
    for uri in ["/people?limit=0", "/people?limit=101", "/people?offset=-1", "/people?limit=abc"] {
      let resp = send(&router, "GET", uri, vec![], None).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
      assert_eq!(json_body(resp).await["error"]["code"], "VALIDATION");
    }
  }

  #[tokio::test]
  async fn list_if_none_match_returns_304_until_a_write() {
    let router = make_router().await;
    create(&router, alice()).await;

    let resp = send(&router, "GET", "/people?limit=1", vec![], None).await;
    let etag = resp.headers()[header::ETAG].to_str().unwrap().to_string();

    let resp = send(&router, "GET", "/people?limit=1", vec![(header::IF_NONE_MATCH, etag.as_str())], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

    create(&router, json!({ "name": "Bob", "surname": "B", "email": "bob@example.com" })).await;
    let resp = send(&router, "GET", "/people?limit=1", vec![(header::IF_NONE_MATCH, etag.as_str())], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
