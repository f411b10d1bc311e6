//! Auth endpoint client. Calls go out without a bearer token.

use mdd_core::{
  Error, Result,
  api::AuthApi,
  principal::{Credentials, LoginResponse, Principal, Registration},
};
use reqwest::{Method, StatusCode};

use crate::{
  CallKind, RequestAuthenticator,
  authenticator::{decode, error_for_status, is_auth_failure},
};

#[derive(Clone)]
pub struct AuthClient {
  http: RequestAuthenticator,
}

impl AuthClient {
  pub fn new(http: RequestAuthenticator) -> Self { Self { http } }
}

impl AuthApi for AuthClient {
  /// `POST /api/auth/login`
  ///
  /// The server answers unknown emails with 404 and bad passwords with 400;
  /// both, like 401/403, mean the credentials were wrong.
  async fn login(&self, credentials: Credentials) -> Result<LoginResponse> {
    let req = self
      .http
      .request(Method::POST, "/auth/login")
      .json(&credentials);
    let resp = self.http.send(CallKind::Auth, req).await?;
    let status = resp.status();
    if is_auth_failure(status)
      || status == StatusCode::BAD_REQUEST
      || status == StatusCode::NOT_FOUND
    {
      return Err(Error::InvalidCredentials);
    }
    decode(error_for_status(resp).await?).await
  }

  /// `POST /api/auth/register`
  ///
  /// Input is validated before sending, so a 400 or 409 from the server
  /// means the email is taken.
  async fn register(&self, registration: Registration) -> Result<Principal> {
    let req = self
      .http
      .request(Method::POST, "/auth/register")
      .json(&registration);
    let resp = self.http.send(CallKind::Auth, req).await?;
    let status = resp.status();
    if status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT {
      return Err(Error::EmailAlreadyExists);
    }
    decode(error_for_status(resp).await?).await
  }
}
