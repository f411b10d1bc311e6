//! Post resource client.

use mdd_core::{
  Error, PostId, Result,
  post::{NewPost, Post, PostQuery},
};
use reqwest::Method;

use crate::RequestAuthenticator;

#[derive(Clone)]
pub struct PostClient {
  http: RequestAuthenticator,
}

impl PostClient {
  pub fn new(http: RequestAuthenticator) -> Self { Self { http } }

  /// `GET /api/post?sortBy=<field>&order=<asc|desc>`
  pub async fn list(&self, query: &PostQuery) -> Result<Vec<Post>> {
    let req = self
      .http
      .request(Method::GET, "/post")
      .query(&[("sortBy", query.sort_by.as_str()), ("order", query.order.as_str())]);
    self.http.fetch(req).await
  }

  /// `GET /api/post/:id`
  pub async fn get(&self, id: PostId) -> Result<Post> {
    let req = self.http.request(Method::GET, &format!("/post/{id}"));
    self.http.fetch(req).await.map_err(|e| match e {
      Error::NotFound(_) => Error::NotFound(format!("post {id}")),
      e => e,
    })
  }

  /// `POST /api/post`
  pub async fn create(&self, post: &NewPost) -> Result<Post> {
    let req = self.http.request(Method::POST, "/post").json(post);
    self.http.fetch(req).await
  }

  /// `PUT /api/post/:id`
  pub async fn update(&self, id: PostId, post: &NewPost) -> Result<Post> {
    let req = self
      .http
      .request(Method::PUT, &format!("/post/{id}"))
      .json(post);
    self.http.fetch(req).await
  }
}
