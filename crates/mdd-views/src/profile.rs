//! The profile view: account details and followed subjects.

use mdd_core::{
  Error, Result, SubjectId,
  api::ResourceApi,
  principal::{ProfileUpdate, Session, User},
  subject::Subject,
  validate,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{JoinOrchestrator, ViewScope};

pub struct ProfileView<A> {
  orchestrator: JoinOrchestrator<A>,
  scope:        ViewScope,
  user:         Mutex<Option<User>>,
}

impl<A: ResourceApi> ProfileView<A> {
  pub fn new(orchestrator: JoinOrchestrator<A>) -> Self {
    Self {
      scope: ViewScope::new(orchestrator.session()),
      orchestrator,
      user: Mutex::new(None),
    }
  }

  pub fn user(&self) -> Option<User> { self.user.lock().clone() }

  pub fn subscriptions(&self) -> Vec<Subject> {
    self
      .user
      .lock()
      .as_ref()
      .map(|u| u.subscription.clone())
      .unwrap_or_default()
  }

  pub async fn load(&self) -> Result<User> {
    let principal = self
      .orchestrator
      .session()
      .principal()
      .ok_or(Error::Unauthenticated)?;
    let user = self
      .scope
      .run(self.orchestrator.api().get_user(principal.id))
      .await?;
    self.scope.commit(|| *self.user.lock() = Some(user.clone()))?;
    Ok(user)
  }

  /// Save the profile and carry the new name and email into the session.
  pub async fn update(&self, update: ProfileUpdate) -> Result<User> {
    validate::profile_update(&update)?;
    let session = self.orchestrator.session();
    let current = session.current().ok_or(Error::Unauthenticated)?;
    let ticket = session.ticket();

    let user = self
      .scope
      .run(
        self
          .orchestrator
          .api()
          .update_user(current.principal.id, update),
      )
      .await?;
    info!(user = %user.id, "profile updated");

    // Only rewrite the session this update was made under.
    if user.id == current.principal.id && session.ticket() == ticket {
      let renewed = Session {
        principal: user.to_principal(),
        token:     current.token,
      };
      if !session.set_session(ticket, renewed).await? {
        debug!("logged out during profile update; session left alone");
      }
    }

    self.scope.commit(|| {
      let mut slot = self.user.lock();
      let subscription = slot
        .as_ref()
        .map(|u| u.subscription.clone())
        .unwrap_or_default();
      let mut fresh = user.clone();
      if fresh.subscription.is_empty() {
        fresh.subscription = subscription;
      }
      *slot = Some(fresh);
    })?;
    Ok(user)
  }

  /// Unfollow `subject`, then reload the subscription list.
  pub async fn unfollow(&self, subject: SubjectId) -> Result<User> {
    let principal = self
      .orchestrator
      .session()
      .principal()
      .ok_or(Error::Unauthenticated)?;
    self
      .scope
      .run(self.orchestrator.api().unsubscribe(principal.id, subject))
      .await?;
    info!(subject = %subject, "unfollowed from profile");
    self.load().await
  }

  pub fn teardown(&self) { self.scope.teardown() }
}
