//! The `SubscriptionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! The service layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  period::MonthDate,
  subscription::{NewSubscription, Subscription},
};

/// Page size used when a caller asks for a non-positive limit.
pub const DEFAULT_LIMIT: i64 = 100;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Exact-match predicates for [`SubscriptionStore::list`]. Unset fields do
/// not constrain the result; set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
  pub user_id:      Option<Uuid>,
  pub service_name: Option<String>,
}

/// Offset/limit window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub limit:  i64,
  pub offset: i64,
}

impl Page {
  /// Normalise raw caller input: a non-positive `limit` becomes
  /// [`DEFAULT_LIMIT`], a negative `offset` becomes zero.
  pub fn new(limit: i64, offset: i64) -> Self {
    Self {
      limit:  if limit <= 0 { DEFAULT_LIMIT } else { limit },
      offset: offset.max(0),
    }
  }
}

impl Default for Page {
  fn default() -> Self { Self::new(0, 0) }
}

/// An inclusive month range plus optional filters. Drives both the overlap
/// scan and cost aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
  pub period_start: MonthDate,
  pub period_end:   MonthDate,
  pub user_id:      Option<Uuid>,
  pub service_name: Option<String>,
}

impl PeriodQuery {
  pub fn new(period_start: MonthDate, period_end: MonthDate) -> Self {
    Self { period_start, period_end, user_id: None, service_name: None }
  }

  pub fn user(mut self, user_id: Uuid) -> Self {
    self.user_id = Some(user_id);
    self
  }

  pub fn service(mut self, service_name: impl Into<String>) -> Self {
    self.service_name = Some(service_name.into());
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a durable subscription store.
///
/// Every method maps to one atomic statement against the backend; the store
/// is the only shared mutable state in the system. Absence is reported as
/// `None`/`false` and turned into a typed error by the service.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new subscription. The store assigns `id`, `created_at` and
  /// `updated_at`.
  fn create(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Retrieve a subscription by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Replace the mutable fields of an existing subscription and stamp
  /// `updated_at`. Returns `None` (and writes nothing) if `id` is unknown.
  fn update(
    &self,
    id: Uuid,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Hard-delete a subscription. Returns `false` if nothing was deleted.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// List subscriptions matching `filter`, oldest `created_at` first, within
  /// `page`.
  fn list<'a>(
    &'a self,
    filter: &'a SubscriptionFilter,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;

  /// Every subscription whose active interval intersects the query period:
  /// `start_date <= period_end AND (end_date IS NULL OR end_date >=
  /// period_start)`, narrowed by the optional filters. Evaluated by the
  /// backend, never by fetching the whole table.
  fn scan_overlapping<'a>(
    &'a self,
    query: &'a PeriodQuery,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;
}
