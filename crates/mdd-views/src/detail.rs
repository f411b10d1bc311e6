//! The post detail view: post, subject title, author and enriched comments.

use std::sync::Arc;

use chrono::Utc;
use mdd_core::{
  Error, ErrorKind, PostId, Result,
  api::ResourceApi,
  date::format_short,
  post::NewComment,
  validate,
  view::{CommentView, PostDetailView, PostView, UNKNOWN_AUTHOR, UNKNOWN_SUBJECT},
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info};

use crate::{JoinOrchestrator, ScopeHandle, ViewScope};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
  Idle,
  LoadingPost,
  LoadingAuthorAndSubject,
  LoadingComments,
  EnrichingComments,
  Ready(PostDetailView),
  Error(ErrorKind),
}

impl DetailState {
  pub fn is_loading(&self) -> bool {
    matches!(
      self,
      DetailState::LoadingPost
        | DetailState::LoadingAuthorAndSubject
        | DetailState::LoadingComments
        | DetailState::EnrichingComments
    )
  }

  /// Whether `next` may directly follow this state.
  fn permits(&self, next: &DetailState) -> bool {
    use DetailState::*;
    match (self, next) {
      (Idle, LoadingPost)
      | (LoadingPost, LoadingAuthorAndSubject)
      | (LoadingAuthorAndSubject, LoadingComments)
      | (LoadingComments, EnrichingComments)
      | (EnrichingComments, Ready(_))
      | (Ready(_) | Error(_), Idle) => true,
      (current, Error(_)) => current.is_loading(),
      _ => false,
    }
  }
}

struct Shared<A> {
  orchestrator: JoinOrchestrator<A>,
  post_id:      PostId,
  state:        watch::Sender<DetailState>,
  scope:        ScopeHandle,
}

impl<A: ResourceApi> Shared<A> {
  /// Move to `next` through the commit gate. Fails with `Cancelled` after
  /// teardown, or if another load moved the machine on in the meantime.
  fn advance(&self, next: DetailState) -> Result<()> {
    let applied = self.scope.commit(|| {
      self.state.send_if_modified(|current| {
        if !current.permits(&next) {
          return false;
        }
        *current = next;
        true
      })
    })?;
    if applied { Ok(()) } else { Err(Error::Cancelled) }
  }

  async fn load(&self) -> Result<()> {
    self.advance(DetailState::LoadingPost)?;
    match self.scope.run(self.fetch()).await {
      Ok(view) => {
        self.advance(DetailState::Ready(view))?;
        debug!(post = %self.post_id, "post detail ready");
        Ok(())
      }
      Err(Error::Cancelled) => Err(Error::Cancelled),
      Err(e) => {
        // Refused after teardown; the caller still gets `e`.
        let _ = self.advance(DetailState::Error(e.kind()));
        Err(e)
      }
    }
  }

  async fn fetch(&self) -> Result<PostDetailView> {
    let orch = &self.orchestrator;
    let post = orch.api().get_post(self.post_id).await?;

    self.advance(DetailState::LoadingAuthorAndSubject)?;
    // The subject title is independent of the author and comment chain.
    let (titles, chain) = futures::join!(
      orch.subject_titles(&self.scope, [post.subject_id]),
      async {
        let authors = orch.author_names(&self.scope, [post.author_id]).await;

        self.advance(DetailState::LoadingComments)?;
        let comments = orch.api().list_comments(post.id).await?;

        self.advance(DetailState::EnrichingComments)?;
        let comments = orch.comment_views(&self.scope, comments).await;
        Ok::<_, Error>((authors, comments))
      },
    );
    let (authors, comments) = chain?;
    let author_name = authors
      .get(&post.author_id)
      .cloned()
      .unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned());
    let subject_title = titles
      .get(&post.subject_id)
      .cloned()
      .unwrap_or_else(|| UNKNOWN_SUBJECT.to_owned());

    Ok(PostDetailView {
      post: PostView { post, author_name },
      subject_title,
      comments,
    })
  }
}

/// One activation of the detail view for a single post.
pub struct PostDetail<A> {
  shared: Arc<Shared<A>>,
  scope:  ViewScope,
}

impl<A: ResourceApi> PostDetail<A> {
  pub fn new(orchestrator: JoinOrchestrator<A>, post_id: PostId) -> Self {
    let scope = ViewScope::new(orchestrator.session());
    let (state, _) = watch::channel(DetailState::Idle);
    Self {
      shared: Arc::new(Shared {
        orchestrator,
        post_id,
        state,
        scope: scope.handle(),
      }),
      scope,
    }
  }

  pub fn post_id(&self) -> PostId { self.shared.post_id }

  pub fn state(&self) -> DetailState { self.shared.state.borrow().clone() }

  pub fn subscribe(&self) -> watch::Receiver<DetailState> { self.shared.state.subscribe() }

  /// Load from `Idle` on the calling task. Does nothing in any other state;
  /// `Ready` stays put until [`refresh`](Self::refresh).
  pub async fn load(&self) -> Result<()> {
    if *self.shared.state.borrow() != DetailState::Idle {
      return Ok(());
    }
    self.shared.load().await
  }

  /// Reload a `Ready` view from scratch.
  pub async fn refresh(&self) -> Result<()> {
    self.restart(|s| matches!(s, DetailState::Ready(_))).await
  }

  /// Reload after a failure.
  pub async fn retry(&self) -> Result<()> {
    self.restart(|s| matches!(s, DetailState::Error(_))).await
  }

  async fn restart(&self, from: impl Fn(&DetailState) -> bool) -> Result<()> {
    if !from(&*self.shared.state.borrow()) {
      return Ok(());
    }
    self.shared.advance(DetailState::Idle)?;
    self.shared.load().await
  }

  /// Post a comment and append it to the loaded view.
  pub async fn add_comment(&self, text: &str) -> Result<CommentView> {
    let orch = &self.shared.orchestrator;
    let principal = orch.session().principal().ok_or(Error::Unauthenticated)?;
    if !matches!(*self.shared.state.borrow(), DetailState::Ready(_)) {
      return Err(Error::Validation("the post is not loaded".into()));
    }

    let sent_at = Utc::now();
    let comment = NewComment {
      post_id:     self.shared.post_id,
      author_id:   principal.id,
      description: text.trim().to_owned(),
      date:        sent_at,
    };
    validate::new_comment(&comment)?;

    let created = self
      .scope
      .run(orch.api().add_comment(self.shared.post_id, comment))
      .await?;
    let view = CommentView {
      formatted_date: format_short(created.date.unwrap_or(sent_at)),
      author_name:    principal.display_name,
      comment:        created,
    };

    self.scope.commit(|| {
      self.shared.state.send_modify(|state| {
        if let DetailState::Ready(detail) = state {
          detail.comments.push(view.clone());
        }
      })
    })?;
    info!(post = %self.shared.post_id, "comment added");
    Ok(view)
  }

  pub fn teardown(&self) { self.scope.teardown() }
}

impl<A: ResourceApi + 'static> PostDetail<A> {
  /// Load on a task owned by the view; aborted at teardown.
  pub fn start(&self) -> JoinHandle<Result<()>> {
    let shared = self.shared.clone();
    self.scope.spawn(async move {
      if *shared.state.borrow() != DetailState::Idle {
        return Ok(());
      }
      shared.load().await
    })
  }
}
