//! The post feed and the post create/edit form.

use mdd_core::{
  Error, PostId, Result, SubjectId,
  api::ResourceApi,
  post::{NewPost, Post, PostQuery, SortOrder},
  subject::Subject,
  validate,
  view::PostView,
};
use mdd_session::Route;
use parking_lot::Mutex;
use tracing::info;

use crate::{JoinOrchestrator, ViewScope};

// ─── Feed ────────────────────────────────────────────────────────────────────

pub struct PostList<A> {
  orchestrator: JoinOrchestrator<A>,
  scope:        ViewScope,
  order:        Mutex<SortOrder>,
  posts:        Mutex<Vec<PostView>>,
}

impl<A: ResourceApi> PostList<A> {
  pub fn new(orchestrator: JoinOrchestrator<A>, order: SortOrder) -> Self {
    Self {
      scope: ViewScope::new(orchestrator.session()),
      orchestrator,
      order: Mutex::new(order),
      posts: Mutex::new(Vec::new()),
    }
  }

  pub fn order(&self) -> SortOrder { *self.order.lock() }

  pub fn posts(&self) -> Vec<PostView> { self.posts.lock().clone() }

  /// Fetch the feed in the current order and attach author names.
  pub async fn load(&self) -> Result<Vec<PostView>> {
    let query = PostQuery {
      order: self.order(),
      ..PostQuery::default()
    };
    let posts = self
      .scope
      .run(self.orchestrator.api().list_posts(query))
      .await?;
    let views = self
      .scope
      .run(async { Ok(self.orchestrator.post_views(&self.scope, posts).await) })
      .await?;

    self.scope.commit(|| *self.posts.lock() = views.clone())?;
    Ok(views)
  }

  /// Flip the sort order and reload.
  pub async fn toggle_order(&self) -> Result<Vec<PostView>> {
    self.scope.commit(|| {
      let mut order = self.order.lock();
      *order = order.reversed();
    })?;
    self.load().await
  }

  pub fn teardown(&self) { self.scope.teardown() }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Create a post (`editing == None`) or edit an existing one.
pub struct PostForm<A> {
  orchestrator: JoinOrchestrator<A>,
  scope:        ViewScope,
  editing:      Option<PostId>,
}

impl<A: ResourceApi> PostForm<A> {
  pub fn new(orchestrator: JoinOrchestrator<A>, editing: Option<PostId>) -> Self {
    Self {
      scope: ViewScope::new(orchestrator.session()),
      orchestrator,
      editing,
    }
  }

  pub fn route(&self) -> Route { Route::PostForm(self.editing) }

  /// Subjects a post can be filed under.
  pub async fn subjects(&self) -> Result<Vec<Subject>> {
    self.scope.run(self.orchestrator.api().list_subjects()).await
  }

  /// The post being edited, if any.
  pub async fn existing(&self) -> Result<Option<Post>> {
    let Some(id) = self.editing else {
      return Ok(None);
    };
    self
      .scope
      .run(self.orchestrator.api().get_post(id))
      .await
      .map(Some)
  }

  pub async fn submit(&self, title: &str, description: &str, subject: SubjectId) -> Result<Post> {
    let principal = self
      .orchestrator
      .session()
      .principal()
      .ok_or(Error::Unauthenticated)?;
    let post = NewPost {
      title:       title.trim().to_owned(),
      description: description.trim().to_owned(),
      subject_id:  subject,
      author_id:   principal.id,
    };
    validate::new_post(&post)?;

    let api = self.orchestrator.api();
    let saved = match self.editing {
      None => self.scope.run(api.create_post(post)).await?,
      Some(id) => self.scope.run(api.update_post(id, post)).await?,
    };
    info!(post = %saved.id, created = self.editing.is_none(), "post saved");
    Ok(saved)
  }

  pub fn teardown(&self) { self.scope.teardown() }
}
