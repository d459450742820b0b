//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded back into its domain type.
  #[error("corrupt {column} column: {value:?}")]
  Decode { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
