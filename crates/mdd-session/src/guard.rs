//! Route authorization guard.
//!
//! A pure, synchronous check against [`SessionStore::current`]. The session
//! is restored into memory at startup, so the guard never waits on I/O.

use std::fmt;

use mdd_core::PostId;
use tracing::debug;

use crate::SessionStore;

/// The navigable views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Home,
  Login,
  Register,
  Posts,
  PostDetail(PostId),
  /// `None` creates a post, `Some` edits one.
  PostForm(Option<PostId>),
  Subjects,
  Profile,
}

impl Route {
  pub fn is_protected(&self) -> bool {
    !matches!(self, Route::Home | Route::Login | Route::Register)
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Route::Home => f.write_str("/home"),
      Route::Login => f.write_str("/login"),
      Route::Register => f.write_str("/register"),
      Route::Posts => f.write_str("/post"),
      Route::PostDetail(id) => write!(f, "/post/{id}"),
      Route::PostForm(None) => f.write_str("/post/create"),
      Route::PostForm(Some(id)) => write!(f, "/post/{id}/edit"),
      Route::Subjects => f.write_str("/subject"),
      Route::Profile => f.write_str("/user"),
    }
  }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
  Proceed(Route),
  /// Navigation to `from` was cancelled in favour of `to`.
  Redirect { from: Route, to: Route },
}

#[derive(Clone)]
pub struct RouteGuard {
  session: SessionStore,
}

impl RouteGuard {
  pub fn new(session: SessionStore) -> Self { Self { session } }

  pub fn can_activate(&self, route: Route) -> bool {
    !route.is_protected() || self.session.is_authenticated()
  }

  pub fn check(&self, route: Route) -> Navigation {
    if self.can_activate(route) {
      Navigation::Proceed(route)
    } else {
      debug!(%route, "not logged in; redirecting to login");
      Navigation::Redirect {
        from: route,
        to:   Route::Login,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use mdd_core::{
    UserId,
    principal::{Principal, Session},
  };

  use super::*;
  use crate::MemoryPersistence;

  fn guard() -> (RouteGuard, SessionStore) {
    let store = SessionStore::new(Arc::new(MemoryPersistence::new()));
    (RouteGuard::new(store.clone()), store)
  }

  #[test]
  fn denies_protected_routes_without_session() {
    let (g, _) = guard();
    for route in [
      Route::Posts,
      Route::PostDetail(PostId(3)),
      Route::PostForm(None),
      Route::Subjects,
      Route::Profile,
    ] {
      assert_eq!(
        g.check(route),
        Navigation::Redirect {
          from: route,
          to:   Route::Login,
        }
      );
    }
  }

  #[test]
  fn public_routes_always_proceed() {
    let (g, _) = guard();
    for route in [Route::Home, Route::Login, Route::Register] {
      assert_eq!(g.check(route), Navigation::Proceed(route));
    }
  }

  #[tokio::test]
  async fn permits_protected_routes_with_session() {
    let (g, store) = guard();
    let session = Session {
      principal: Principal {
        id:           UserId(1),
        display_name: "alice".into(),
        email:        "a@b.com".into(),
      },
      token:     "T".into(),
    };
    store.set_session(store.ticket(), session).await.unwrap();
    assert_eq!(g.check(Route::Subjects), Navigation::Proceed(Route::Subjects));

    store.clear().await.unwrap();
    assert!(!g.can_activate(Route::Subjects));
  }

  #[test]
  fn paths() {
    assert_eq!(Route::PostDetail(PostId(7)).to_string(), "/post/7");
    assert_eq!(Route::PostForm(Some(PostId(7))).to_string(), "/post/7/edit");
  }
}
