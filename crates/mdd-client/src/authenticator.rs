//! The request decorator every API call goes through.
//!
//! Resource calls get `Authorization: Bearer <token>` from the current
//! session; auth calls never do. A 401/403 on a resource call expires the
//! session the request was sent under and surfaces as
//! [`Error::AuthExpired`]. Auth calls get their raw response back so the
//! caller can classify credential failures itself.

use mdd_core::{Error, Result};
use mdd_session::SessionStore;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
  /// Login/register: no token attached, no forced logout.
  Auth,
  Resource,
}

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RequestAuthenticator {
  client:   Client,
  base_url: String,
  session:  SessionStore,
}

impl RequestAuthenticator {
  pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
      session,
    })
  }

  pub fn session(&self) -> &SessionStore { &self.session }

  fn url(&self, path: &str) -> String { format!("{}/api{}", self.base_url, path) }

  /// Start a request against `/api{path}`.
  pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.client.request(method, self.url(path))
  }

  /// Send `req`, decorated according to `kind`.
  pub async fn send(&self, kind: CallKind, req: RequestBuilder) -> Result<Response> {
    // Ticket before token: if a write lands in between, the ticket is the
    // older one and a 401 cannot clear the newer session.
    let ticket = (kind == CallKind::Resource).then(|| self.session.ticket());
    let req = match (kind, self.session.token()) {
      (CallKind::Resource, Some(token)) => req.bearer_auth(token),
      _ => req,
    };

    let request = req
      .build()
      .map_err(|e| Error::Network(format!("invalid request: {e}")))?;
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let resp = self.client.execute(request).await.map_err(|e| {
      debug!(%method, %path, "transport error: {e}");
      Error::Network(e.to_string())
    })?;
    let status = resp.status();
    debug!(%method, %path, status = status.as_u16(), "api call");

    if let Some(ticket) = ticket
      && is_auth_failure(status)
    {
      warn!(%method, %path, status = status.as_u16(), "authorization refused");
      if let Err(e) = self.session.expire(ticket).await {
        warn!("forced logout could not erase the persisted session: {e}");
      }
      return Err(Error::AuthExpired);
    }
    Ok(resp)
  }

  /// Send a resource call and decode its JSON body.
  pub async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    let resp = self.send(CallKind::Resource, req).await?;
    decode(error_for_status(resp).await?).await
  }

  /// Send a resource call whose body is irrelevant.
  pub async fn execute(&self, req: RequestBuilder) -> Result<()> {
    let resp = self.send(CallKind::Resource, req).await?;
    error_for_status(resp).await?;
    Ok(())
  }
}

pub fn is_auth_failure(status: StatusCode) -> bool {
  status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Map a non-2xx response onto the error taxonomy.
pub async fn error_for_status(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  let message = server_message(status, &body);
  Err(match status {
    StatusCode::NOT_FOUND => Error::NotFound(message),
    s if s.is_server_error() => Error::Server(message),
    _ => Error::Validation(message),
  })
}

pub async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
  resp.json().await.map_err(|e| {
    if e.is_decode() {
      Error::Server(format!("malformed response: {e}"))
    } else {
      Error::Network(e.to_string())
    }
  })
}

/// Best human-readable explanation in an error body.
fn server_message(status: StatusCode, body: &str) -> String {
  let from_json = serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| {
      ["message", "error"]
        .iter()
        .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_owned))
    });
  match from_json {
    Some(m) => m,
    None if !body.trim().is_empty() => body.trim().to_owned(),
    None => status.to_string(),
  }
}
