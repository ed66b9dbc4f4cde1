//! Error type for `roost-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] roost_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to change the status of a record that was not found.
  #[error("validation record not found: {0}")]
  RecordNotFound(String),

  #[error("record {id} already resolved to {status:?}")]
  StatusFinal {
    id:     String,
    status: roost_core::grid::ValidationStatus,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
