//! User resource client.

use mdd_core::{
  Error, Result, UserId,
  principal::{ProfileUpdate, User},
};
use reqwest::Method;

use crate::RequestAuthenticator;

#[derive(Clone)]
pub struct UserClient {
  http: RequestAuthenticator,
}

impl UserClient {
  pub fn new(http: RequestAuthenticator) -> Self { Self { http } }

  /// `GET /api/user/:id`
  pub async fn get(&self, id: UserId) -> Result<User> {
    let req = self.http.request(Method::GET, &format!("/user/{id}"));
    self.http.fetch(req).await.map_err(|e| match e {
      Error::NotFound(_) => Error::NotFound(format!("user {id}")),
      e => e,
    })
  }

  /// `PUT /api/user/:id`
  pub async fn update(&self, id: UserId, update: &ProfileUpdate) -> Result<User> {
    let req = self
      .http
      .request(Method::PUT, &format!("/user/{id}"))
      .json(update);
    self.http.fetch(req).await
  }
}
