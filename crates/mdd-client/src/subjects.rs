//! Subject resource client and the subscription endpoints.

use mdd_core::{
  Result, SubjectId, UserId,
  subject::{Subject, SubjectList},
};
use reqwest::Method;

use crate::RequestAuthenticator;

#[derive(Clone)]
pub struct SubjectClient {
  http: RequestAuthenticator,
}

impl SubjectClient {
  pub fn new(http: RequestAuthenticator) -> Self { Self { http } }

  /// `GET /api/subject`, unwrapping the `{"subject": [...]}` envelope.
  pub async fn list(&self) -> Result<Vec<Subject>> {
    let req = self.http.request(Method::GET, "/subject");
    let list: SubjectList = self.http.fetch(req).await?;
    Ok(list.subject)
  }

  /// `POST /api/subscriptions/:userId/:subjectId`
  pub async fn subscribe(&self, user: UserId, subject: SubjectId) -> Result<()> {
    let req = self
      .http
      .request(Method::POST, &format!("/subscriptions/{user}/{subject}"));
    self.http.execute(req).await
  }

  /// `DELETE /api/subscriptions/:userId/:subjectId`
  pub async fn unsubscribe(&self, user: UserId, subject: SubjectId) -> Result<()> {
    let req = self
      .http
      .request(Method::DELETE, &format!("/subscriptions/{user}/{subject}"));
    self.http.execute(req).await
  }
}
