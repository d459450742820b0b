//! Month-overlap billing.
//!
//! A subscription is charged its full monthly price for every calendar month
//! its active interval touches inside the query period. There is no per-day
//! proration, so every figure here is an exact integer.

use crate::{period::MonthDate, subscription::Subscription};

/// The single currency all prices are expressed in.
pub const CURRENCY: &str = "RUB";

/// Whole calendar months of `sub` that fall inside
/// `[period_start, period_end]`. Zero when the two do not overlap, including
/// when the period itself is reversed.
pub fn billed_months(
  sub: &Subscription,
  period_start: MonthDate,
  period_end: MonthDate,
) -> i64 {
  let effective_end = sub.end_date.map_or(period_end, |end| end.min(period_end));
  let effective_start = sub.start_date.max(period_start);

  (effective_end.ordinal() - effective_start.ordinal() + 1).max(0)
}

/// What `sub` costs over the period.
pub fn cost(sub: &Subscription, period_start: MonthDate, period_end: MonthDate) -> i64 {
  billed_months(sub, period_start, period_end) * i64::from(sub.price)
}

/// Sum of [`cost`] over `subs`. Records that do not overlap contribute
/// nothing; an empty input totals zero.
pub fn total_cost<'a, I>(subs: I, period_start: MonthDate, period_end: MonthDate) -> i64
where
  I: IntoIterator<Item = &'a Subscription>,
{
  subs
    .into_iter()
    .map(|sub| cost(sub, period_start, period_end))
    .sum()
}
