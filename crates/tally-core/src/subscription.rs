//! Subscription: a user's recurring monthly charge for one service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, period::MonthDate};

/// A persisted subscription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  /// Assigned by the store at creation; never changes.
  pub id:           Uuid,
  pub service_name: String,
  /// Monthly price in whole units of the fixed currency.
  pub price:        u32,
  pub user_id:      Uuid,
  /// First billed month.
  pub start_date:   MonthDate,
  /// Last billed month; `None` while the subscription is still running.
  pub end_date:     Option<MonthDate>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// The caller-supplied fields of a subscription.
///
/// Input to both create and update; an update replaces every one of these
/// fields and leaves `id` and `created_at` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
  pub service_name: String,
  pub price:        u32,
  pub user_id:      Uuid,
  pub start_date:   MonthDate,
  pub end_date:     Option<MonthDate>,
}

impl NewSubscription {
  /// Reject an end month that precedes the start month.
  pub fn validate(&self) -> Result<()> {
    match self.end_date {
      Some(end) if end < self.start_date => Err(Error::InvalidRange {
        start: self.start_date,
        end,
      }),
      _ => Ok(()),
    }
  }
}

impl Subscription {
  /// The caller-supplied portion of this record.
  pub fn fields(&self) -> NewSubscription {
    NewSubscription {
      service_name: self.service_name.clone(),
      price:        self.price,
      user_id:      self.user_id,
      start_date:   self.start_date,
      end_date:     self.end_date,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(start: (i32, u32), end: Option<(i32, u32)>) -> NewSubscription {
    NewSubscription {
      service_name: "Yandex Plus".into(),
      price:        400,
      user_id:      Uuid::new_v4(),
      start_date:   MonthDate::new(start.0, start.1).unwrap(),
      end_date:     end.map(|(y, m)| MonthDate::new(y, m).unwrap()),
    }
  }

  #[test]
  fn open_ended_and_single_month_ranges_are_valid() {
    assert!(input((2025, 7), None).validate().is_ok());
    assert!(input((2025, 7), Some((2025, 7))).validate().is_ok());
  }

  #[test]
  fn end_before_start_is_rejected() {
    let err = input((2025, 7), Some((2025, 6))).validate().unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }), "{err}");
  }
}
