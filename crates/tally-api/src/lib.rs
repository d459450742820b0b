//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by a [`SubscriptionService`] over any
//! [`SubscriptionStore`]. Health checks, tracing, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(tally_api::api_router(ApiState::new(service)))
//! ```

pub mod aggregate;
pub mod error;
pub mod subscriptions;

use axum::{Router, routing::get};
use tally_core::{service::SubscriptionService, store::SubscriptionStore};

pub use error::ApiError;

/// Page size for `GET /subscriptions` when the caller omits `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub service:   SubscriptionService<S>,
  pub page_size: i64,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { service: self.service.clone(), page_size: self.page_size }
  }
}

impl<S: SubscriptionStore> ApiState<S> {
  pub fn new(service: SubscriptionService<S>) -> Self {
    Self { service, page_size: DEFAULT_PAGE_SIZE }
  }

  /// Override the list page size; non-positive values keep the default.
  pub fn with_page_size(mut self, page_size: i64) -> Self {
    if page_size > 0 {
      self.page_size = page_size;
    }
    self
  }
}

/// Build the subscription API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: SubscriptionStore + 'static,
{
  Router::new()
    .route(
      "/subscriptions",
      get(subscriptions::list::<S>).post(subscriptions::create::<S>),
    )
    .route("/subscriptions/aggregate", get(aggregate::handler::<S>))
    .route(
      "/subscriptions/{id}",
      get(subscriptions::get_one::<S>)
        .put(subscriptions::update::<S>)
        .delete(subscriptions::delete_one::<S>),
    )
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use tally_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_state() -> ApiState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    ApiState::new(SubscriptionService::new(store))
  }

  async fn send(
    state:  ApiState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    api_router(state).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn payload(user_id: Uuid) -> Value {
    json!({
      "service_name": "Yandex Plus",
      "price": 400,
      "user_id": user_id,
      "start_date": "07-2025"
    })
  }

  async fn create(state: &ApiState<SqliteStore>, body: Value) -> Value {
    let resp = send(state.clone(), "POST", "/subscriptions", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await
  }

  // ── Create / get ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_and_get_returns_it() {
    let state = make_state().await;
    let user = Uuid::new_v4();
    let created = create(&state, payload(user)).await;

    assert_eq!(created["service_name"], "Yandex Plus");
    assert_eq!(created["price"], 400);
    assert_eq!(created["user_id"], user.to_string());
    assert_eq!(created["start_date"], "07-2025");
    assert_eq!(created["end_date"], Value::Null);

    let id = created["id"].as_str().unwrap();
    let resp = send(state, "GET", &format!("/subscriptions/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, created);
  }

  #[tokio::test]
  async fn create_accepts_year_first_dates() {
    let state = make_state().await;
    let mut body = payload(Uuid::new_v4());
    body["start_date"] = json!("2025-01");
    body["end_date"] = json!("2025-12");

    let created = create(&state, body).await;
    assert_eq!(created["start_date"], "01-2025");
    assert_eq!(created["end_date"], "12-2025");
  }

  #[tokio::test]
  async fn create_rejects_invalid_fields() {
    let state = make_state().await;
    let user = Uuid::new_v4();

    let mut cases = Vec::new();
    for (field, value) in [
      ("service_name", json!("   ")),
      ("price", json!(-1)),
      ("user_id", json!("not-a-uuid")),
      ("start_date", json!("2025/07")),
      ("end_date", json!("13-2025")),
    ] {
      let mut body = payload(user);
      body[field] = value;
      cases.push(body);
    }
    let mut missing = payload(user);
    missing.as_object_mut().unwrap().remove("price");
    cases.push(missing);

    for body in cases {
      let resp = send(state.clone(), "POST", "/subscriptions", Some(body.clone())).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "accepted {body}");
      assert!(json_body(resp).await["error"].is_string());
    }
  }

  #[tokio::test]
  async fn create_rejects_end_before_start() {
    let state = make_state().await;
    let mut body = payload(Uuid::new_v4());
    body["end_date"] = json!("06-2025");

    let resp = send(state, "POST", "/subscriptions", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn get_unknown_returns_404_and_malformed_id_400() {
    let state = make_state().await;
    let resp = send(state.clone(), "GET", &format!("/subscriptions/{}", Uuid::new_v4()), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(state, "GET", "/subscriptions/not-a-uuid", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Update ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_replaces_record() {
    let state = make_state().await;
    let user = Uuid::new_v4();
    let created = create(&state, payload(user)).await;
    let id = created["id"].as_str().unwrap();

    let mut body = payload(user);
    body["price"] = json!(500);
    body["end_date"] = json!("12-2025");
    let resp = send(state.clone(), "PUT", &format!("/subscriptions/{id}"), Some(body)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated = json_body(resp).await;
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_eq!(updated["price"], 500);
    assert_eq!(updated["end_date"], "12-2025");
  }

  #[tokio::test]
  async fn update_unknown_returns_404_and_creates_nothing() {
    let state = make_state().await;
    let uri = format!("/subscriptions/{}", Uuid::new_v4());
    let resp = send(state.clone(), "PUT", &uri, Some(payload(Uuid::new_v4()))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(state, "GET", "/subscriptions", None).await;
    assert_eq!(json_body(resp).await, json!([]));
  }

  // ── Delete ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_returns_204_then_404() {
    let state = make_state().await;
    let created = create(&state, payload(Uuid::new_v4())).await;
    let uri = format!("/subscriptions/{}", created["id"].as_str().unwrap());

    let resp = send(state.clone(), "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(state.clone(), "GET", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(state, "DELETE", &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── List ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_pages_and_filters() {
    let state = make_state().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let first = create(&state, payload(alice)).await;
    let second = create(&state, payload(alice)).await;
    create(&state, payload(bob)).await;

    let resp = send(state.clone(), "GET", "/subscriptions?limit=1&page=2", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_body(resp).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
    assert_eq!(page[0]["id"], second["id"]);

    let uri = format!("/subscriptions?user_id={alice}&service_name=Yandex%20Plus");
    let resp = send(state.clone(), "GET", &uri, None).await;
    let hits = json_body(resp).await;
    assert_eq!(hits.as_array().unwrap().len(), 2);
    assert_eq!(hits[0]["id"], first["id"]);

    let resp = send(state, "GET", "/subscriptions?limit=junk&page=0", None).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn list_rejects_malformed_user_id() {
    let state = make_state().await;
    let resp = send(state, "GET", "/subscriptions?user_id=nope", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Aggregate ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn aggregate_sums_touched_months() {
    let state = make_state().await;
    let alice = Uuid::new_v4();
    create(&state, payload(alice)).await;
    create(&state, payload(Uuid::new_v4())).await;

    let resp = send(state.clone(), "GET", "/subscriptions/aggregate?from=07-2025&to=2025-08", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      json_body(resp).await,
      json!({ "total_cost": 1600, "currency": "RUB", "from": "07-2025", "to": "2025-08" })
    );

    let uri = format!("/subscriptions/aggregate?from=07-2025&to=08-2025&user_id={alice}");
    let resp = send(state, "GET", &uri, None).await;
    assert_eq!(json_body(resp).await["total_cost"], 800);
  }

  #[tokio::test]
  async fn aggregate_with_no_matches_is_zero() {
    let state = make_state().await;
    let resp = send(state, "GET", "/subscriptions/aggregate?from=01-2020&to=12-2020", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["total_cost"], 0);
  }

  #[tokio::test]
  async fn aggregate_validates_parameters() {
    let state = make_state().await;
    for query in [
      "",
      "?from=07-2025",
      "?from=&to=08-2025",
      "?from=2025/07&to=08-2025",
      "?from=07-2025&to=August",
      "?from=07-2025&to=08-2025&user_id=nope",
    ] {
      let uri = format!("/subscriptions/aggregate{query}");
      let resp = send(state.clone(), "GET", &uri, None).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query {query:?}");
    }
  }
}
