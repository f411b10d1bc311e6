//! Error taxonomy shared by every layer of the client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected before any network call, or a 4xx the server explained.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("email already in use")]
  EmailAlreadyExists,

  /// An authenticated call was refused; the session has been cleared.
  #[error("session expired, please log in again")]
  AuthExpired,

  #[error("not logged in")]
  Unauthenticated,

  #[error("network error: {0}")]
  Network(String),

  #[error("server error: {0}")]
  Server(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// The work was discarded: its view was torn down, or a newer session
  /// write made it stale.
  #[error("operation cancelled")]
  Cancelled,

  #[error("session persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Field-less mirror of [`Error`], cheap to copy into view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  InvalidCredentials,
  EmailAlreadyExists,
  AuthExpired,
  Unauthenticated,
  Network,
  Server,
  NotFound,
  Cancelled,
  Persistence,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Validation(_) => ErrorKind::Validation,
      Error::InvalidCredentials => ErrorKind::InvalidCredentials,
      Error::EmailAlreadyExists => ErrorKind::EmailAlreadyExists,
      Error::AuthExpired => ErrorKind::AuthExpired,
      Error::Unauthenticated => ErrorKind::Unauthenticated,
      Error::Network(_) => ErrorKind::Network,
      Error::Server(_) => ErrorKind::Server,
      Error::NotFound(_) => ErrorKind::NotFound,
      Error::Cancelled => ErrorKind::Cancelled,
      Error::Persistence(_) => ErrorKind::Persistence,
    }
  }

  /// Whether the user has to log in (again) before retrying.
  pub fn requires_login(&self) -> bool {
    matches!(self, Error::AuthExpired | Error::Unauthenticated)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
