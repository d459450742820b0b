//! Month-granular dates and the textual period parser.
//!
//! Billing works in whole calendar months, so every date in the domain is a
//! [`MonthDate`]: a calendar date pinned to the first day of its month. The
//! canonical instant for a month is midnight UTC on that day.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Accepted textual layouts, tried in order: chrono format string and the
/// byte offset of the separating dash.
const LAYOUTS: [(&str, usize); 2] = [("%m-%Y", 2), ("%Y-%m", 4)];

// ─── MonthDate ───────────────────────────────────────────────────────────────

/// A calendar month, stored as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDate(NaiveDate);

impl MonthDate {
  /// Build from a year and a 1-based month. Returns `None` for month 0 or
  /// anything past 12.
  pub fn new(year: i32, month: u32) -> Option<Self> {
    NaiveDate::from_ymd_opt(year, month, 1).map(Self)
  }

  /// Normalise any calendar date to the month containing it.
  pub fn from_date(date: NaiveDate) -> Self {
    Self(date.with_day(1).unwrap_or(date))
  }

  pub fn year(&self) -> i32 { self.0.year() }

  pub fn month(&self) -> u32 { self.0.month() }

  /// Months elapsed since year zero: `year * 12 + month`. Differences of
  /// this value count whole calendar months.
  pub fn ordinal(&self) -> i64 {
    i64::from(self.year()) * 12 + i64::from(self.month())
  }

  /// The first day of the month.
  pub fn first_day(&self) -> NaiveDate { self.0 }

  /// Midnight UTC on the first day of the month.
  pub fn start_instant(&self) -> DateTime<Utc> {
    self.0.and_time(chrono::NaiveTime::MIN).and_utc()
  }
}

impl fmt::Display for MonthDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}-{:04}", self.month(), self.year())
  }
}

impl FromStr for MonthDate {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { parse_month(s) }
}

impl Serialize for MonthDate {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for MonthDate {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_month(&s).map_err(serde::de::Error::custom)
  }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Parse `MM-YYYY` or `YYYY-MM` into a [`MonthDate`].
///
/// Layouts are tried in that order and the first match wins. Both require
/// zero-padded two-digit months and four-digit years.
pub fn parse_month(s: &str) -> Result<MonthDate> {
  LAYOUTS
    .iter()
    .find_map(|&(format, dash)| parse_layout(s, format, dash))
    .ok_or_else(|| Error::InvalidDateFormat(s.to_owned()))
}

fn parse_layout(s: &str, format: &str, dash: usize) -> Option<MonthDate> {
  let well_formed = s.len() == 7
    && s.bytes().enumerate().all(|(i, b)| {
      if i == dash { b == b'-' } else { b.is_ascii_digit() }
    });
  if !well_formed {
    return None;
  }

  NaiveDate::parse_from_str(&format!("{s}-01"), &format!("{format}-%d"))
    .ok()
    .map(MonthDate::from_date)
}
