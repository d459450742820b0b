//! The SQLite implementation of [`SubscriptionStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tally_core::{
  store::{Page, PeriodQuery, SubscriptionFilter, SubscriptionStore},
  subscription::{NewSubscription, Subscription},
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{COLUMNS, RawSubscription, encode_dt, encode_month, encode_uuid, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subscription store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("subscription schema ready");
    Ok(())
  }
}

/// Run a `SELECT` over [`COLUMNS`] and collect the raw rows.
fn query_rows<P: rusqlite::Params>(
  conn: &rusqlite::Connection,
  sql: &str,
  params: P,
) -> rusqlite::Result<Vec<RawSubscription>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params, RawSubscription::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewSubscription) -> Result<Subscription> {
    let at = now();
    let sub = Subscription {
      id:           Uuid::new_v4(),
      service_name: input.service_name,
      price:        input.price,
      user_id:      input.user_id,
      start_date:   input.start_date,
      end_date:     input.end_date,
      created_at:   at,
      updated_at:   at,
    };

    let id_str      = encode_uuid(sub.id);
    let name        = sub.service_name.clone();
    let price       = i64::from(sub.price);
    let user_id_str = encode_uuid(sub.user_id);
    let start_str   = encode_month(sub.start_date);
    let end_str     = sub.end_date.map(encode_month);
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             id, service_name, price, user_id,
             start_date, end_date, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![id_str, name, price, user_id_str, start_str, end_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(sub)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM subscriptions WHERE id = ?1"),
            rusqlite::params![id_str],
            RawSubscription::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn update(&self, id: Uuid, input: NewSubscription) -> Result<Option<Subscription>> {
    let id_str      = encode_uuid(id);
    let price       = i64::from(input.price);
    let user_id_str = encode_uuid(input.user_id);
    let start_str   = encode_month(input.start_date);
    let end_str     = input.end_date.map(encode_month);
    let at_str      = encode_dt(now());
    let name        = input.service_name;

    // A single UPDATE ... RETURNING: an unknown id matches no row, writes
    // nothing, and yields `None`.
    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE subscriptions
               SET service_name = ?2, price = ?3, user_id = ?4,
                   start_date = ?5, end_date = ?6, updated_at = ?7
               WHERE id = ?1
               RETURNING {COLUMNS}"
            ),
            rusqlite::params![id_str, name, price, user_id_str, start_str, end_str, at_str],
            RawSubscription::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM subscriptions WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn list<'a>(
    &'a self,
    filter: &'a SubscriptionFilter,
    page: Page,
  ) -> Result<Vec<Subscription>> {
    let user_id_str  = filter.user_id.map(encode_uuid);
    let service_name = filter.service_name.clone();
    let (limit, offset) = (page.limit, page.offset);

    // Unset filters bind NULL and short-circuit their predicate.
    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(query_rows(
          conn,
          &format!(
            "SELECT {COLUMNS} FROM subscriptions
             WHERE (?1 IS NULL OR user_id = ?1)
               AND (?2 IS NULL OR service_name = ?2)
             ORDER BY created_at, rowid
             LIMIT ?3 OFFSET ?4"
          ),
          rusqlite::params![user_id_str, service_name, limit, offset],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn scan_overlapping<'a>(&'a self, query: &'a PeriodQuery) -> Result<Vec<Subscription>> {
    let from_str     = encode_month(query.period_start);
    let to_str       = encode_month(query.period_end);
    let user_id_str  = query.user_id.map(encode_uuid);
    let service_name = query.service_name.clone();

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(query_rows(
          conn,
          &format!(
            "SELECT {COLUMNS} FROM subscriptions
             WHERE start_date <= ?1
               AND (end_date IS NULL OR end_date >= ?2)
               AND (?3 IS NULL OR user_id = ?3)
               AND (?4 IS NULL OR service_name = ?4)
             ORDER BY created_at, rowid"
          ),
          rusqlite::params![to_str, from_str, user_id_str, service_name],
        )?)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }
}
