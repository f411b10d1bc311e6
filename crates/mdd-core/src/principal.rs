//! Identity types: the logged-in principal, its session, and the user record.

use serde::{Deserialize, Serialize};

use crate::{UserId, subject::Subject};

/// The authenticated user's identity data. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:           UserId,
  #[serde(rename = "userName")]
  pub display_name: String,
  pub email:        String,
}

/// A principal together with its bearer token.
///
/// Held as `Option<Session>` everywhere, so a principal without a token (or
/// the reverse) cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub principal: Principal,
  pub token:     String,
}

/// `POST /api/auth/login` response: the principal fields plus `token`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
  pub id:        UserId,
  #[serde(rename = "userName")]
  pub user_name: String,
  #[serde(default)]
  pub email:     String,
  pub token:     String,
}

impl LoginResponse {
  /// Split into a [`Session`]. `fallback_email` fills in a missing `email`
  /// with the address the user logged in with.
  pub fn into_session(self, fallback_email: &str) -> Session {
    let email = if self.email.is_empty() {
      fallback_email.to_owned()
    } else {
      self.email
    };
    Session {
      principal: Principal {
        id: self.id,
        display_name: self.user_name,
        email,
      },
      token:     self.token,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
  pub email:     String,
  #[serde(rename = "userName")]
  pub user_name: String,
  pub password:  String,
}

/// Body of `PUT /api/user/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
  #[serde(rename = "userName")]
  pub user_name: String,
  pub email:     String,
  pub password:  String,
}

/// A user record as returned by `GET /api/user/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:           UserId,
  #[serde(rename = "userName")]
  pub user_name:    String,
  #[serde(default)]
  pub email:        String,
  /// Subjects this user follows.
  #[serde(default)]
  pub subscription: Vec<Subject>,
}

impl User {
  pub fn to_principal(&self) -> Principal {
    Principal {
      id:           self.id,
      display_name: self.user_name.clone(),
      email:        self.email.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn login_response_splits_into_session() {
    let resp: LoginResponse =
      serde_json::from_str(r#"{"id":1,"userName":"alice","email":"a@b.com","token":"T"}"#)
        .unwrap();
    let session = resp.into_session("ignored@b.com");
    assert_eq!(session.principal.id, UserId(1));
    assert_eq!(session.principal.display_name, "alice");
    assert_eq!(session.principal.email, "a@b.com");
    assert_eq!(session.token, "T");
  }

  #[test]
  fn login_response_without_email_uses_fallback() {
    let resp: LoginResponse =
      serde_json::from_str(r#"{"id":1,"userName":"alice","token":"T"}"#).unwrap();
    assert_eq!(resp.into_session("a@b.com").principal.email, "a@b.com");
  }

  #[test]
  fn user_ignores_password_field() {
    let user: User = serde_json::from_str(
      r#"{"id":3,"userName":"bob","email":"b@c.org","password":"$2a$hash","subscription":[]}"#,
    )
    .unwrap();
    let json = serde_json::to_string(&user.to_principal()).unwrap();
    assert!(!json.contains("password"));
  }
}
