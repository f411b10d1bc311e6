//! Traits at the seams between the orchestration layer and its backends.
//!
//! [`ResourceApi`] and [`AuthApi`] are implemented over HTTP by `mdd-client`;
//! [`SessionPersistence`] by `mdd-session` (in memory) and `mdd-store-sqlite`.
//! Higher layers depend on these abstractions, never on a concrete backend.

use std::{future::Future, sync::Arc};

use futures::future::BoxFuture;

use crate::{
  PostId, Result, SubjectId, UserId,
  post::{Comment, NewComment, NewPost, Post, PostQuery},
  principal::{Credentials, LoginResponse, Principal, ProfileUpdate, Registration, Session, User},
  subject::Subject,
};

// ─── Resources ───────────────────────────────────────────────────────────────

/// Typed access to the remote REST resources.
///
/// Implementations attach credentials and classify failures; they perform no
/// joining, caching or retrying. All futures are `Send` so views can run them
/// on spawned tasks.
pub trait ResourceApi: Send + Sync {
  // ── Posts ─────────────────────────────────────────────────────────────

  /// `GET /api/post?sortBy&order`
  fn list_posts(&self, query: PostQuery) -> impl Future<Output = Result<Vec<Post>>> + Send + '_;

  /// `GET /api/post/:id`
  fn get_post(&self, id: PostId) -> impl Future<Output = Result<Post>> + Send + '_;

  /// `POST /api/post`
  fn create_post(&self, post: NewPost) -> impl Future<Output = Result<Post>> + Send + '_;

  /// `PUT /api/post/:id`
  fn update_post(
    &self,
    id: PostId,
    post: NewPost,
  ) -> impl Future<Output = Result<Post>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// `GET /api/post/:id/comment`
  fn list_comments(&self, post: PostId) -> impl Future<Output = Result<Vec<Comment>>> + Send + '_;

  /// `POST /api/post/:id/comment`
  fn add_comment(
    &self,
    post: PostId,
    comment: NewComment,
  ) -> impl Future<Output = Result<Comment>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// `GET /api/subject`
  fn list_subjects(&self) -> impl Future<Output = Result<Vec<Subject>>> + Send + '_;

  /// `POST /api/subscriptions/:userId/:subjectId`
  fn subscribe(
    &self,
    user: UserId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// `DELETE /api/subscriptions/:userId/:subjectId`
  fn unsubscribe(
    &self,
    user: UserId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// `GET /api/user/:id`
  fn get_user(&self, id: UserId) -> impl Future<Output = Result<User>> + Send + '_;

  /// `PUT /api/user/:id`
  fn update_user(
    &self,
    id: UserId,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<User>> + Send + '_;
}

// ─── Auth ────────────────────────────────────────────────────────────────────

/// The credential exchange endpoints. Never sent with a bearer token.
pub trait AuthApi: Send + Sync {
  /// `POST /api/auth/login`
  fn login(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<LoginResponse>> + Send + '_;

  /// `POST /api/auth/register`
  fn register(
    &self,
    registration: Registration,
  ) -> impl Future<Output = Result<Principal>> + Send + '_;
}

// ─── Shared handles ──────────────────────────────────────────────────────────

impl<T: ResourceApi + ?Sized> ResourceApi for Arc<T> {
  fn list_posts(&self, query: PostQuery) -> impl Future<Output = Result<Vec<Post>>> + Send + '_ {
    (**self).list_posts(query)
  }

  fn get_post(&self, id: PostId) -> impl Future<Output = Result<Post>> + Send + '_ {
    (**self).get_post(id)
  }

  fn create_post(&self, post: NewPost) -> impl Future<Output = Result<Post>> + Send + '_ {
    (**self).create_post(post)
  }

  fn update_post(
    &self,
    id: PostId,
    post: NewPost,
  ) -> impl Future<Output = Result<Post>> + Send + '_ {
    (**self).update_post(id, post)
  }

  fn list_comments(&self, post: PostId) -> impl Future<Output = Result<Vec<Comment>>> + Send + '_ {
    (**self).list_comments(post)
  }

  fn add_comment(
    &self,
    post: PostId,
    comment: NewComment,
  ) -> impl Future<Output = Result<Comment>> + Send + '_ {
    (**self).add_comment(post, comment)
  }

  fn list_subjects(&self) -> impl Future<Output = Result<Vec<Subject>>> + Send + '_ {
    (**self).list_subjects()
  }

  fn subscribe(
    &self,
    user: UserId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    (**self).subscribe(user, subject)
  }

  fn unsubscribe(
    &self,
    user: UserId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    (**self).unsubscribe(user, subject)
  }

  fn get_user(&self, id: UserId) -> impl Future<Output = Result<User>> + Send + '_ {
    (**self).get_user(id)
  }

  fn update_user(
    &self,
    id: UserId,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<User>> + Send + '_ {
    (**self).update_user(id, update)
  }
}

impl<T: AuthApi + ?Sized> AuthApi for Arc<T> {
  fn login(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<LoginResponse>> + Send + '_ {
    (**self).login(credentials)
  }

  fn register(
    &self,
    registration: Registration,
  ) -> impl Future<Output = Result<Principal>> + Send + '_ {
    (**self).register(registration)
  }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

/// What a [`SessionPersistence`] backend found on disk.
///
/// The two entries are stored separately, so either may be missing; the
/// session store decides what a half-present pair means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSession {
  pub principal: Option<Principal>,
  pub token:     Option<String>,
}

impl PersistedSession {
  /// The pair as a session, if and only if both entries are present.
  pub fn into_session(self) -> Option<Session> {
    match (self.principal, self.token) {
      (Some(principal), Some(token)) => Some(Session { principal, token }),
      _ => None,
    }
  }

  pub fn is_empty(&self) -> bool { self.principal.is_none() && self.token.is_none() }
}

/// Durable storage for the `principal` and `token` entries.
///
/// Object-safe so the session store can hold any backend behind an `Arc`.
/// `save` and `clear` must write or erase both entries as one unit.
pub trait SessionPersistence: Send + Sync {
  fn load(&self) -> BoxFuture<'_, Result<PersistedSession>>;

  fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<()>>;

  fn clear(&self) -> BoxFuture<'_, Result<()>>;
}
