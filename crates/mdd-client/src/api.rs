//! [`ApiClient`]: the resource clients behind one [`ResourceApi`] handle.

use mdd_core::{
  PostId, Result, SubjectId, UserId,
  api::ResourceApi,
  post::{Comment, NewComment, NewPost, Post, PostQuery},
  principal::{ProfileUpdate, User},
  subject::Subject,
};

use crate::{
  RequestAuthenticator, comments::CommentClient, posts::PostClient, subjects::SubjectClient,
  users::UserClient,
};

#[derive(Clone)]
pub struct ApiClient {
  pub posts:    PostClient,
  pub comments: CommentClient,
  pub subjects: SubjectClient,
  pub users:    UserClient,
}

impl ApiClient {
  /// All four clients share `http`, and with it the session and connection pool.
  pub fn new(http: RequestAuthenticator) -> Self {
    Self {
      posts:    PostClient::new(http.clone()),
      comments: CommentClient::new(http.clone()),
      subjects: SubjectClient::new(http.clone()),
      users:    UserClient::new(http),
    }
  }
}

impl ResourceApi for ApiClient {
  async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>> {
    self.posts.list(&query).await
  }

  async fn get_post(&self, id: PostId) -> Result<Post> { self.posts.get(id).await }

  async fn create_post(&self, post: NewPost) -> Result<Post> { self.posts.create(&post).await }

  async fn update_post(&self, id: PostId, post: NewPost) -> Result<Post> {
    self.posts.update(id, &post).await
  }

  async fn list_comments(&self, post: PostId) -> Result<Vec<Comment>> {
    self.comments.list(post).await
  }

  async fn add_comment(&self, post: PostId, comment: NewComment) -> Result<Comment> {
    self.comments.add(post, &comment).await
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> { self.subjects.list().await }

  async fn subscribe(&self, user: UserId, subject: SubjectId) -> Result<()> {
    self.subjects.subscribe(user, subject).await
  }

  async fn unsubscribe(&self, user: UserId, subject: SubjectId) -> Result<()> {
    self.subjects.unsubscribe(user, subject).await
  }

  async fn get_user(&self, id: UserId) -> Result<User> { self.users.get(id).await }

  async fn update_user(&self, id: UserId, update: ProfileUpdate) -> Result<User> {
    self.users.update(id, &update).await
  }
}
