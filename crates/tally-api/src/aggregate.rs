//! Handler for `GET /subscriptions/aggregate`.
//!
//! `from` and `to` are required and accept `MM-YYYY` or `YYYY-MM`; both ends
//! are inclusive. `user_id` and `service_name` narrow the set of
//! subscriptions that are summed.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tally_core::{
  billing::CURRENCY,
  period::parse_month,
  store::{PeriodQuery, SubscriptionStore},
};

use crate::{
  ApiState,
  error::ApiError,
  subscriptions::{non_empty, parse_uuid},
};

#[derive(Debug, Deserialize, Default)]
pub struct AggregateParams {
  pub from:         Option<String>,
  pub to:           Option<String>,
  pub user_id:      Option<String>,
  pub service_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AggregateResponse {
  /// Total cost of all matching subscriptions over the period.
  pub total_cost: i64,
  pub currency:   &'static str,
  /// The period bounds exactly as supplied.
  pub from:       String,
  pub to:         String,
}

/// `GET /subscriptions/aggregate?from=...&to=...[&user_id=...][&service_name=...]`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<AggregateParams>,
) -> Result<Json<AggregateResponse>, ApiError>
where
  S: SubscriptionStore,
{
  let (Some(from), Some(to)) = (non_empty(params.from), non_empty(params.to)) else {
    return Err(ApiError::BadRequest("from and to are required".into()));
  };

  let period_start = parse_month(&from)
    .map_err(|e| ApiError::BadRequest(format!("invalid from date: {e}")))?;
  let period_end =
    parse_month(&to).map_err(|e| ApiError::BadRequest(format!("invalid to date: {e}")))?;

  let query = PeriodQuery {
    period_start,
    period_end,
    user_id: non_empty(params.user_id)
      .map(|raw| parse_uuid("user_id", &raw))
      .transpose()?,
    service_name: non_empty(params.service_name),
  };

  let total_cost = state.service.aggregate_total_cost(&query).await?;
  Ok(Json(AggregateResponse { total_cost, currency: CURRENCY, from, to }))
}
