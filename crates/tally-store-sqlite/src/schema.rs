//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout version.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS subscriptions (
    id            TEXT PRIMARY KEY,
    service_name  TEXT NOT NULL,
    price         INTEGER NOT NULL CHECK (price >= 0),
    user_id       TEXT NOT NULL,
    start_date    TEXT NOT NULL,   -- YYYY-MM-01
    end_date      TEXT,            -- YYYY-MM-01, NULL while still active
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC, microsecond precision
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subscriptions_user_idx    ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS subscriptions_service_idx ON subscriptions(service_name);
CREATE INDEX IF NOT EXISTS subscriptions_period_idx  ON subscriptions(start_date, end_date);
CREATE INDEX IF NOT EXISTS subscriptions_created_idx ON subscriptions(created_at);

PRAGMA user_version = 1;
";
