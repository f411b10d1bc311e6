//! [`JoinOrchestrator`]: stitches independently fetched resources into view
//! models.
//!
//! Lookups of foreign ids are deduplicated before any request is made, run
//! concurrently on the caller's task, and reassembled in input order. A
//! failed lookup is logged and replaced by a sentinel; it never fails the
//! view. Results go into the activation's [`LookupCache`](crate::LookupCache)
//! through the scope's commit gate.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use mdd_core::{
  Error, Result, SubjectId, UserId,
  api::ResourceApi,
  date::format_short,
  post::{Comment, Post},
  subject::Subject,
  view::{CommentView, PostView, SubjectView, UNKNOWN_AUTHOR, UNKNOWN_SUBJECT},
};
use mdd_session::SessionStore;
use tracing::{debug, warn};

use crate::scope::ScopeHandle;

/// Ids in first-seen order, without repeats.
fn distinct<T: Copy + Eq + std::hash::Hash>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
  let mut seen = HashSet::new();
  ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[derive(Clone)]
pub struct JoinOrchestrator<A> {
  api:     A,
  session: SessionStore,
}

impl<A: ResourceApi> JoinOrchestrator<A> {
  pub fn new(api: A, session: SessionStore) -> Self { Self { api, session } }

  pub fn api(&self) -> &A { &self.api }

  pub fn session(&self) -> &SessionStore { &self.session }

  /// Resolve display names, one request per uncached id.
  pub async fn author_names(
    &self,
    scope: &ScopeHandle,
    ids: impl IntoIterator<Item = UserId>,
  ) -> HashMap<UserId, String> {
    let cache = scope.cache();
    let mut names = HashMap::new();
    let mut missing = Vec::new();
    for id in distinct(ids) {
      match cache.author(id) {
        Some(name) => {
          names.insert(id, name);
        }
        None => missing.push(id),
      }
    }
    if missing.is_empty() {
      return names;
    }

    let epoch = cache.epoch();
    debug!(lookups = missing.len(), cached = names.len(), "resolving authors");
    let lookups = missing
      .into_iter()
      .map(|id| async move { (id, self.api.get_user(id).await) });

    for (id, outcome) in join_all(lookups).await {
      let name = match outcome {
        Ok(user) => {
          let stored = scope.commit(|| cache.insert_author(epoch, id, user.user_name.clone()));
          if !matches!(stored, Ok(true)) {
            debug!(user = %id, "author name not cached: scope or session moved on");
          }
          user.user_name
        }
        Err(e) => {
          warn!(user = %id, "author lookup failed: {e}");
          UNKNOWN_AUTHOR.to_owned()
        }
      };
      names.insert(id, name);
    }
    names
  }

  /// Resolve subject titles.
  ///
  /// There is no per-id endpoint; the first lookup of an activation fetches
  /// the whole list and caches every title.
  pub async fn subject_titles(
    &self,
    scope: &ScopeHandle,
    ids: impl IntoIterator<Item = SubjectId>,
  ) -> HashMap<SubjectId, String> {
    let cache = scope.cache();
    let wanted = distinct(ids);

    let titles: HashMap<SubjectId, String> = if cache.has_subject_titles() {
      wanted
        .iter()
        .filter_map(|id| cache.subject(*id).map(|t| (*id, t)))
        .collect()
    } else {
      let epoch = cache.epoch();
      match self.api.list_subjects().await {
        Ok(subjects) => {
          let all: HashMap<_, _> = subjects.into_iter().map(|s| (s.id, s.title)).collect();
          let stored = scope.commit(|| cache.insert_subject_titles(epoch, all.clone()));
          if !matches!(stored, Ok(true)) {
            debug!("subject titles not cached: scope or session moved on");
          }
          all
        }
        Err(e) => {
          warn!("subject lookup failed: {e}");
          HashMap::new()
        }
      }
    };

    wanted
      .into_iter()
      .map(|id| {
        let title = titles.get(&id).cloned().unwrap_or_else(|| {
          debug!(subject = %id, "no title for subject");
          UNKNOWN_SUBJECT.to_owned()
        });
        (id, title)
      })
      .collect()
  }

  pub async fn post_views(&self, scope: &ScopeHandle, posts: Vec<Post>) -> Vec<PostView> {
    let names = self
      .author_names(scope, posts.iter().map(|p| p.author_id))
      .await;
    posts
      .into_iter()
      .map(|post| PostView {
        author_name: author_or_sentinel(&names, post.author_id),
        post,
      })
      .collect()
  }

  /// Resolve every comment author, then format dates in one pass. Output
  /// order equals input order.
  pub async fn comment_views(&self, scope: &ScopeHandle, comments: Vec<Comment>) -> Vec<CommentView> {
    let names = self
      .author_names(scope, comments.iter().map(|c| c.author_id))
      .await;
    comments
      .into_iter()
      .map(|comment| CommentView {
        author_name:    author_or_sentinel(&names, comment.author_id),
        formatted_date: comment.date.map(format_short).unwrap_or_default(),
        comment,
      })
      .collect()
  }

  /// Mark the subjects the logged-in user follows.
  ///
  /// Following is read from the user's subscription list; if that lookup
  /// fails the subjects' own subscriber lists are used instead.
  pub async fn subject_views(&self, subjects: Vec<Subject>) -> Result<Vec<SubjectView>> {
    let principal = self.session.principal().ok_or(Error::Unauthenticated)?;

    let followed: HashSet<SubjectId> = match self.api.get_user(principal.id).await {
      Ok(user) => user.subscription.iter().map(|s| s.id).collect(),
      Err(e) => {
        warn!(user = %principal.id, "subscription lookup failed; using subscriber lists: {e}");
        subjects
          .iter()
          .filter(|s| s.subscriber_ids.contains(&principal.id))
          .map(|s| s.id)
          .collect()
      }
    };

    Ok(
      subjects
        .into_iter()
        .map(|subject| SubjectView {
          followed: followed.contains(&subject.id),
          subject,
        })
        .collect(),
    )
  }
}

fn author_or_sentinel(names: &HashMap<UserId, String>, id: UserId) -> String {
  names
    .get(&id)
    .cloned()
    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned())
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, atomic::Ordering};

  use mdd_core::PostId;

  use super::*;
  use crate::{
    ViewScope,
    fake::{self, FakeApi},
  };

  async fn setup(api: FakeApi) -> (JoinOrchestrator<Arc<FakeApi>>, ViewScope) {
    let session = fake::signed_in().await;
    let scope = ViewScope::new(&session);
    (JoinOrchestrator::new(Arc::new(api), session), scope)
  }

  #[tokio::test]
  async fn one_lookup_per_distinct_author() {
    let api = FakeApi::default().with_user(1, "alice").with_user(2, "bob");
    let (orch, scope) = setup(api).await;

    let posts: Vec<_> = [(1, 1), (2, 2), (3, 1), (4, 2), (5, 1)]
      .into_iter()
      .map(|(id, author)| fake::post(id, author, 1))
      .collect();
    let views = orch.post_views(&scope, posts).await;

    assert_eq!(orch.api().lookups(), 2);
    let rows: Vec<_> = views
      .iter()
      .map(|v| (v.post.id, v.author_name.as_str()))
      .collect();
    assert_eq!(rows, [
      (PostId(1), "alice"),
      (PostId(2), "bob"),
      (PostId(3), "alice"),
      (PostId(4), "bob"),
      (PostId(5), "alice"),
    ]);

    // A second pass in the same activation is served from the cache.
    orch.post_views(&scope, vec![fake::post(6, 2, 1)]).await;
    assert_eq!(orch.api().lookups(), 2);
  }

  #[tokio::test]
  async fn failed_lookup_yields_sentinel_in_place() {
    let api = FakeApi::default().with_user(1, "alice").with_user(3, "carol");
    api.failing_users.lock().insert(UserId(2));
    let (orch, scope) = setup(api).await;

    let comments = vec![fake::comment(1, 1), fake::comment(2, 2), fake::comment(3, 3)];
    let views = orch.comment_views(&scope, comments).await;

    let rows: Vec<_> = views
      .iter()
      .map(|v| (v.comment.description.as_str(), v.author_name.as_str()))
      .collect();
    assert_eq!(rows, [
      ("comment 1", "alice"),
      ("comment 2", UNKNOWN_AUTHOR),
      ("comment 3", "carol"),
    ]);
    assert_eq!(views[0].formatted_date, "6/15/24, 9:03 AM");
    // The failure is not cached, so a refresh would retry it.
    assert_eq!(scope.cache().author(UserId(2)), None);
  }

  #[tokio::test]
  async fn subject_titles_fetched_once() {
    let api = FakeApi::default();
    api.subjects.lock().extend([fake::subject(1, "Rust"), fake::subject(2, "Go")]);
    let (orch, scope) = setup(api).await;

    let titles = orch.subject_titles(&scope, [SubjectId(2), SubjectId(9)]).await;
    assert_eq!(titles[&SubjectId(2)], "Go");
    assert_eq!(titles[&SubjectId(9)], UNKNOWN_SUBJECT);

    let titles = orch.subject_titles(&scope, [SubjectId(1)]).await;
    assert_eq!(titles[&SubjectId(1)], "Rust");
    assert_eq!(orch.api().subject_lookups.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn subject_failure_is_isolated() {
    let api = FakeApi::default();
    api.failing_subjects.store(true, Ordering::SeqCst);
    let (orch, scope) = setup(api).await;

    let titles = orch.subject_titles(&scope, [SubjectId(1)]).await;
    assert_eq!(titles[&SubjectId(1)], UNKNOWN_SUBJECT);
  }

  #[tokio::test]
  async fn session_change_forces_fresh_lookups() {
    let api = FakeApi::default().with_user(2, "bob");
    let (orch, scope) = setup(api).await;

    orch.author_names(&scope, [UserId(2)]).await;
    orch.session().clear().await.unwrap();
    orch.author_names(&scope, [UserId(2)]).await;
    assert_eq!(orch.api().lookups(), 2);
  }

  #[tokio::test]
  async fn lookups_arriving_after_teardown_are_discarded() {
    let api = FakeApi::default().with_user(2, "bob");
    api.held_users.lock().insert(UserId(2));
    let (orch, scope) = setup(api).await;

    let pending = tokio::spawn({
      let orch = orch.clone();
      let handle = scope.handle();
      async move { orch.author_names(&handle, [UserId(2)]).await }
    });
    orch.api().started.notified().await;

    scope.teardown();
    orch.api().release.notify_waiters();
    pending.await.unwrap();

    assert!(scope.cache().is_empty());
  }

  #[tokio::test]
  async fn titles_fetched_across_a_session_change_are_not_cached() {
    let api = FakeApi::default();
    api.subjects.lock().push(fake::subject(1, "Rust"));
    api.held_subjects.store(true, Ordering::SeqCst);
    let (orch, scope) = setup(api).await;

    let (titles, ()) = tokio::join!(orch.subject_titles(&scope, [SubjectId(1)]), async {
      orch.api().started.notified().await;
      orch.session().clear().await.unwrap();
      orch.api().release.notify_waiters();
    });
    assert_eq!(titles[&SubjectId(1)], "Rust");
    assert!(!scope.cache().has_subject_titles());
  }

  #[tokio::test]
  async fn followed_from_user_subscriptions() {
    let api = FakeApi::default().with_user(1, "alice");
    api.users.lock().get_mut(&UserId(1)).unwrap().subscription = vec![fake::subject(2, "Go")];
    let (orch, _scope) = setup(api).await;

    let views = orch
      .subject_views(vec![fake::subject(1, "Rust"), fake::subject(2, "Go")])
      .await
      .unwrap();
    let followed: Vec<_> = views.iter().map(|v| v.followed).collect();
    assert_eq!(followed, [false, true]);
  }

  #[tokio::test]
  async fn followed_falls_back_to_subscriber_ids() {
    let api = FakeApi::default();
    api.failing_users.lock().insert(UserId(1));
    let (orch, _scope) = setup(api).await;

    let mut rust = fake::subject(1, "Rust");
    rust.subscriber_ids = vec![UserId(1)];
    let views = orch
      .subject_views(vec![rust, fake::subject(2, "Go")])
      .await
      .unwrap();
    let followed: Vec<_> = views.iter().map(|v| v.followed).collect();
    assert_eq!(followed, [true, false]);
  }
}
