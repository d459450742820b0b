//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 strings and month dates are ISO
//! `YYYY-MM-DD` strings, so both sort correctly as text. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use tally_core::{period::MonthDate, subscription::Subscription};
use uuid::Uuid;

use crate::{Error, Result};

/// Column list shared by every `SELECT` and `RETURNING` clause; the order
/// matches [`RawSubscription::from_row`].
pub const COLUMNS: &str =
  "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(column: &'static str, s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| Error::Decode { column, value: s.to_owned() })
}

// ─── MonthDate ───────────────────────────────────────────────────────────────

pub fn encode_month(m: MonthDate) -> String {
  m.first_day().format("%Y-%m-%d").to_string()
}

pub fn decode_month(column: &'static str, s: &str) -> Result<MonthDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map(MonthDate::from_date)
    .map_err(|_| Error::Decode { column, value: s.to_owned() })
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub id:           String,
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  pub start_date:   String,
  pub end_date:     Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawSubscription {
  /// Read a row selected with [`COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      service_name: row.get(1)?,
      price:        row.get(2)?,
      user_id:      row.get(3)?,
      start_date:   row.get(4)?,
      end_date:     row.get(5)?,
      created_at:   row.get(6)?,
      updated_at:   row.get(7)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    let price = u32::try_from(self.price).map_err(|_| Error::Decode {
      column: "price",
      value:  self.price.to_string(),
    })?;

    Ok(Subscription {
      id: decode_uuid(&self.id)?,
      service_name: self.service_name,
      price,
      user_id: decode_uuid(&self.user_id)?,
      start_date: decode_month("start_date", &self.start_date)?,
      end_date: self
        .end_date
        .as_deref()
        .map(|s| decode_month("end_date", s))
        .transpose()?,
      created_at: decode_dt("created_at", &self.created_at)?,
      updated_at: decode_dt("updated_at", &self.updated_at)?,
    })
  }
}
