//! The subject list with follow/unfollow.

use mdd_core::{Error, Result, SubjectId, api::ResourceApi, view::SubjectView};
use parking_lot::Mutex;
use tracing::info;

use crate::{JoinOrchestrator, ViewScope};

pub struct SubjectList<A> {
  orchestrator: JoinOrchestrator<A>,
  scope:        ViewScope,
  items:        Mutex<Vec<SubjectView>>,
}

impl<A: ResourceApi> SubjectList<A> {
  pub fn new(orchestrator: JoinOrchestrator<A>) -> Self {
    Self {
      scope: ViewScope::new(orchestrator.session()),
      orchestrator,
      items: Mutex::new(Vec::new()),
    }
  }

  pub fn items(&self) -> Vec<SubjectView> { self.items.lock().clone() }

  pub async fn load(&self) -> Result<Vec<SubjectView>> {
    let subjects = self
      .scope
      .run(self.orchestrator.api().list_subjects())
      .await?;
    let views = self
      .scope
      .run(self.orchestrator.subject_views(subjects))
      .await?;
    self.scope.commit(|| *self.items.lock() = views.clone())?;
    Ok(views)
  }

  pub async fn follow(&self, id: SubjectId) -> Result<SubjectView> {
    self.set_followed(id, true).await
  }

  pub async fn unfollow(&self, id: SubjectId) -> Result<SubjectView> {
    self.set_followed(id, false).await
  }

  /// The server is asked first; the flag only changes once it agrees.
  async fn set_followed(&self, id: SubjectId, follow: bool) -> Result<SubjectView> {
    let principal = self
      .orchestrator
      .session()
      .principal()
      .ok_or(Error::Unauthenticated)?;
    if !self.items.lock().iter().any(|v| v.subject.id == id) {
      return Err(Error::NotFound(format!("subject {id}")));
    }

    let api = self.orchestrator.api();
    if follow {
      self.scope.run(api.subscribe(principal.id, id)).await?;
    } else {
      self.scope.run(api.unsubscribe(principal.id, id)).await?;
    }
    info!(subject = %id, follow, "subscription changed");

    self
      .scope
      .commit(|| {
        let mut items = self.items.lock();
        let item = items.iter_mut().find(|v| v.subject.id == id)?;
        item.followed = follow;
        let subscribers = &mut item.subject.subscriber_ids;
        subscribers.retain(|u| *u != principal.id);
        if follow {
          subscribers.push(principal.id);
        }
        Some(item.clone())
      })?
      .ok_or_else(|| Error::NotFound(format!("subject {id}")))
  }

  pub fn teardown(&self) { self.scope.teardown() }
}
