//! Error type for `mdd-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl From<Error> for mdd_core::Error {
  fn from(e: Error) -> Self { mdd_core::Error::Persistence(Box::new(e)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
