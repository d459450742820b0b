//! Error types for `tally-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::period::MonthDate;

/// Every failure that can cross the service boundary.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date format: {0:?} (expected MM-YYYY or YYYY-MM)")]
  InvalidDateFormat(String),

  #[error("end date {end} is before start date {start}")]
  InvalidRange { start: MonthDate, end: MonthDate },

  #[error("subscription not found: {0}")]
  SubscriptionNotFound(Uuid),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box an arbitrary backend error into [`Error::Storage`].
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
