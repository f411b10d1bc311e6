//! HTTP client for the mdd REST API.
//!
//! Every request goes through the [`RequestAuthenticator`], which attaches
//! the session's bearer token and turns authorization failures into a forced
//! logout. On top of it sit one thin client per resource, the [`ApiClient`]
//! aggregate implementing [`mdd_core::api::ResourceApi`], and the
//! [`AuthGateway`].

pub mod api;
pub mod auth;
pub mod authenticator;
pub mod comments;
pub mod gateway;
pub mod posts;
pub mod subjects;
pub mod users;

use std::time::Duration;

pub use api::ApiClient;
pub use auth::AuthClient;
pub use authenticator::{CallKind, RequestAuthenticator};
pub use gateway::AuthGateway;

/// Connection settings for the remote API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Scheme, host and port; `/api` is appended per request.
  pub base_url: String,
  pub timeout:  Duration,
}

impl ClientConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      timeout:  Duration::from_secs(30),
    }
  }
}
