//! Read-only view of the bearer token's claims.
//!
//! The server issues HS256 JWTs. The client cannot verify the signature and
//! does not try to; it only reads `exp` so a long-dead token is not restored
//! at startup.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
  pub id:        Option<i64>,
  #[serde(rename = "userName")]
  pub user_name: Option<String>,
  /// The server puts the user's email in the issuer claim.
  pub iss:       Option<String>,
  pub iat:       Option<i64>,
  pub exp:       Option<i64>,
}

impl TokenClaims {
  /// Decode the payload segment. Returns `None` for anything that is not a
  /// three-segment JWT with a JSON payload.
  pub fn decode(token: &str) -> Option<Self> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
      return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
  }

  pub fn expires_at(&self) -> Option<DateTime<Utc>> {
    self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
  }

  /// `true` only when an `exp` claim exists and lies before `now`.
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at().is_some_and(|exp| exp <= now)
  }
}

#[cfg(test)]
pub(crate) fn make_token(payload: &serde_json::Value) -> String {
  let body = URL_SAFE_NO_PAD.encode(payload.to_string());
  format!("eyJhbGciOiJIUzI1NiJ9.{body}.c2ln")
}
