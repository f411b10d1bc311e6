//! [`AuthGateway`]: login, registration and logout over any [`AuthApi`].

use mdd_core::{
  Error, Result,
  api::AuthApi,
  principal::{Credentials, Principal, Registration, Session},
  validate,
};
use mdd_session::SessionStore;
use tracing::{info, warn};

pub struct AuthGateway<A> {
  api:     A,
  session: SessionStore,
}

impl<A: AuthApi> AuthGateway<A> {
  pub fn new(api: A, session: SessionStore) -> Self { Self { api, session } }

  /// Exchange credentials for a session and install it.
  ///
  /// Fails with [`Error::Cancelled`] if the user logged out while the
  /// request was in flight; the session stays cleared in that case.
  pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
    let credentials = Credentials {
      email:    email.trim().to_owned(),
      password: password.to_owned(),
    };
    validate::credentials(&credentials)?;

    let ticket = self.session.ticket();
    let session = self
      .api
      .login(credentials)
      .await?
      .into_session(email.trim());

    if !self.session.set_session(ticket, session.clone()).await? {
      info!(user = %session.principal.id, "login completed after logout; discarded");
      return Err(Error::Cancelled);
    }
    info!(user = %session.principal.id, "logged in");
    Ok(session)
  }

  /// Create an account. Does not log in.
  pub async fn register(&self, registration: Registration) -> Result<Principal> {
    validate::registration(&registration)?;
    let principal = self.api.register(registration).await?;
    info!(user = %principal.id, "registered");
    Ok(principal)
  }

  /// Drop the session locally. No network round trip; never fails.
  pub async fn logout(&self) {
    if let Err(e) = self.session.clear().await {
      warn!("logout could not erase the persisted session: {e}");
    }
    info!("logged out");
  }

  pub fn session(&self) -> &SessionStore { &self.session }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use mdd_core::{UserId, principal::LoginResponse};
  use mdd_session::MemoryPersistence;
  use tokio::sync::Notify;

  use super::*;

  /// Answers logins for `a@b.com` / `Secret123!`; optionally holds each
  /// response until released.
  #[derive(Default)]
  struct FakeAuth {
    calls:   AtomicUsize,
    hold:    bool,
    started: Notify,
    release: Notify,
  }

  impl AuthApi for FakeAuth {
    async fn login(&self, c: Credentials) -> Result<LoginResponse> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.hold {
        self.started.notify_one();
        self.release.notified().await;
      }
      if c.email == "a@b.com" && c.password == "Secret123!" {
        Ok(LoginResponse {
          id:        UserId(1),
          user_name: "alice".into(),
          email:     "a@b.com".into(),
          token:     "T".into(),
        })
      } else {
        Err(Error::InvalidCredentials)
      }
    }

    async fn register(&self, r: Registration) -> Result<Principal> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if r.email == "taken@b.com" {
        return Err(Error::EmailAlreadyExists);
      }
      Ok(Principal {
        id:           UserId(2),
        display_name: r.user_name,
        email:        r.email,
      })
    }
  }

  fn gateway(fake: FakeAuth) -> AuthGateway<Arc<FakeAuth>> {
    let session = SessionStore::new(Arc::new(MemoryPersistence::new()));
    AuthGateway::new(Arc::new(fake), session)
  }

  #[tokio::test]
  async fn login_installs_session_once() {
    let gw = gateway(FakeAuth::default());
    let mut obs = gw.session().observe();
    assert_eq!(obs.next().await, Some(None));

    let session = gw.login("a@b.com", "Secret123!").await.unwrap();
    assert_eq!(session.token, "T");
    assert_eq!(obs.next().await, Some(Some(session.clone())));
    assert_eq!(gw.session().current(), Some(session));
  }

  #[tokio::test]
  async fn bad_credentials_leave_session_empty() {
    let gw = gateway(FakeAuth::default());
    let err = gw.login("a@b.com", "Wrong1234!").await.unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
    assert!(gw.session().current().is_none());
  }

  #[tokio::test]
  async fn invalid_input_never_reaches_the_network() {
    let gw = gateway(FakeAuth::default());
    assert!(matches!(gw.login("not-an-email", "Secret123!").await, Err(Error::Validation(_))));
    let weak = Registration {
      email:     "a@b.com".into(),
      user_name: "alice".into(),
      password:  "password".into(),
    };
    assert!(matches!(gw.register(weak).await, Err(Error::Validation(_))));
    assert_eq!(gw.api.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn register_surfaces_duplicate_email() {
    let gw = gateway(FakeAuth::default());
    let r = Registration {
      email:     "taken@b.com".into(),
      user_name: "alice".into(),
      password:  "Secret123!".into(),
    };
    assert!(matches!(gw.register(r).await, Err(Error::EmailAlreadyExists)));
  }

  #[tokio::test]
  async fn logout_then_late_login_response_stays_logged_out() {
    let gw = Arc::new(gateway(FakeAuth {
      hold: true,
      ..FakeAuth::default()
    }));

    let pending = tokio::spawn({
      let gw = gw.clone();
      async move { gw.login("a@b.com", "Secret123!").await }
    });
    gw.api.started.notified().await;

    gw.logout().await;
    gw.api.release.notify_one();

    let outcome = pending.await.unwrap();
    assert!(matches!(outcome, Err(Error::Cancelled)));
    assert!(gw.session().current().is_none());
  }

  #[tokio::test]
  async fn logout_is_local_and_idempotent() {
    let gw = gateway(FakeAuth::default());
    gw.login("a@b.com", "Secret123!").await.unwrap();
    let calls = gw.api.calls.load(Ordering::SeqCst);

    gw.logout().await;
    gw.logout().await;
    assert!(gw.session().current().is_none());
    assert_eq!(gw.api.calls.load(Ordering::SeqCst), calls);
  }
}
