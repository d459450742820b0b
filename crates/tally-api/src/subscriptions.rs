//! Handlers for `/subscriptions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subscriptions` | Optional `user_id`, `service_name`, `page`, `limit` |
//! | `POST`   | `/subscriptions` | Body: [`SubscriptionBody`]; returns 201 + stored record |
//! | `GET`    | `/subscriptions/{id}` | 404 if not found |
//! | `PUT`    | `/subscriptions/{id}` | Body: [`SubscriptionBody`]; full replacement |
//! | `DELETE` | `/subscriptions/{id}` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::{JsonRejection, PathRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  period::parse_month,
  store::{SubscriptionFilter, SubscriptionStore},
  subscription::{NewSubscription, Subscription},
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Request body ────────────────────────────────────────────────────────────

/// JSON body accepted by create and update.
#[derive(Debug, Deserialize)]
pub struct SubscriptionBody {
  /// e.g. `"Yandex Plus"`; must not be blank.
  pub service_name: String,
  /// Monthly price in RUB; must be non-negative.
  pub price:        i64,
  pub user_id:      String,
  /// `MM-YYYY` or `YYYY-MM`.
  pub start_date:   String,
  /// `MM-YYYY` or `YYYY-MM`; omit or `null` for an open-ended subscription.
  #[serde(default)]
  pub end_date:     Option<String>,
}

impl SubscriptionBody {
  /// Field-level validation and conversion into the domain input.
  pub fn into_input(self) -> Result<NewSubscription, ApiError> {
    if self.service_name.trim().is_empty() {
      return Err(ApiError::BadRequest("service_name is required".into()));
    }
    let price = u32::try_from(self.price).map_err(|_| {
      ApiError::BadRequest("price must be a non-negative integer".into())
    })?;
    let user_id = parse_uuid("user_id", &self.user_id)?;
    let start_date = parse_month(&self.start_date)
      .map_err(|e| ApiError::BadRequest(format!("invalid start_date: {e}")))?;
    let end_date = self
      .end_date
      .as_deref()
      .map(parse_month)
      .transpose()
      .map_err(|e| ApiError::BadRequest(format!("invalid end_date: {e}")))?;

    Ok(NewSubscription {
      service_name: self.service_name,
      price,
      user_id,
      start_date,
      end_date,
    })
  }
}

pub(crate) fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid {field}")))
}

/// Treat `?key=` the same as an absent key.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

fn body(
  payload: Result<Json<SubscriptionBody>, JsonRejection>,
) -> Result<NewSubscription, ApiError> {
  let Json(body) = payload
    .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e.body_text())))?;
  body.into_input()
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
  path
    .map(|Path(id)| id)
    .map_err(|_| ApiError::BadRequest("invalid id".into()))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub user_id:      Option<String>,
  pub service_name: Option<String>,
  /// 1-based page number; anything unparsable or below 1 means page 1.
  pub page:         Option<String>,
  /// Page size; anything unparsable or below 1 means the configured default.
  pub limit:        Option<String>,
}

fn positive(raw: Option<&str>) -> Option<i64> {
  raw.and_then(|s| s.parse::<i64>().ok()).filter(|n| *n >= 1)
}

/// `GET /subscriptions[?user_id=...][&service_name=...][&page=...][&limit=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Subscription>>, ApiError>
where
  S: SubscriptionStore,
{
  let filter = SubscriptionFilter {
    user_id:      non_empty(params.user_id)
      .map(|raw| parse_uuid("user_id", &raw))
      .transpose()?,
    service_name: non_empty(params.service_name),
  };

  let page = positive(params.page.as_deref()).unwrap_or(1);
  let limit = positive(params.limit.as_deref()).unwrap_or(state.page_size);
  let offset = (page - 1).saturating_mul(limit);

  let subs = state.service.list(&filter, limit, offset).await?;
  Ok(Json(subs))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /subscriptions`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<SubscriptionBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore,
{
  let input = body(payload)?;
  let sub = state.service.create(input).await?;
  Ok((StatusCode::CREATED, Json(sub)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /subscriptions/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Subscription>, ApiError>
where
  S: SubscriptionStore,
{
  let id = path_id(path)?;
  Ok(Json(state.service.get(id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /subscriptions/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
  payload: Result<Json<SubscriptionBody>, JsonRejection>,
) -> Result<Json<Subscription>, ApiError>
where
  S: SubscriptionStore,
{
  let id = path_id(path)?;
  let input = body(payload)?;
  Ok(Json(state.service.update(id, input).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /subscriptions/{id}`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: SubscriptionStore,
{
  let id = path_id(path)?;
  state.service.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
