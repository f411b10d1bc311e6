//! Comment resource client. Comments are nested under their post.

use mdd_core::{
  PostId, Result,
  post::{Comment, NewComment},
};
use reqwest::Method;

use crate::RequestAuthenticator;

#[derive(Clone)]
pub struct CommentClient {
  http: RequestAuthenticator,
}

impl CommentClient {
  pub fn new(http: RequestAuthenticator) -> Self { Self { http } }

  /// `GET /api/post/:id/comment`
  pub async fn list(&self, post: PostId) -> Result<Vec<Comment>> {
    let req = self
      .http
      .request(Method::GET, &format!("/post/{post}/comment"));
    self.http.fetch(req).await
  }

  /// `POST /api/post/:id/comment`
  pub async fn add(&self, post: PostId, comment: &NewComment) -> Result<Comment> {
    let req = self
      .http
      .request(Method::POST, &format!("/post/{post}/comment"))
      .json(comment);
    self.http.fetch(req).await
  }
}
