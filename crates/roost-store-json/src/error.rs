//! Error type for `roost-store-json`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] roost_core::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("validation record not found: {0}")]
  RecordNotFound(String),

  #[error("record {id} already resolved to {status:?}")]
  StatusFinal {
    id:     String,
    status: roost_core::grid::ValidationStatus,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
