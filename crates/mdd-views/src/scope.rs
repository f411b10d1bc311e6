//! Cancellation scopes for view activations.
//!
//! A [`ViewScope`] lives exactly as long as one activation of a view. Work
//! started for the view either runs inside [`ScopeHandle::run`] or is
//! spawned with [`ScopeHandle::spawn`]; both stop at teardown. Results that
//! arrive anyway are written back through [`ScopeHandle::commit`], which
//! refuses once the scope is gone.

use std::{future::Future, ops::Deref, sync::Arc};

use mdd_core::{Error, Result};
use mdd_session::SessionStore;
use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::LookupCache;

struct ScopeInner {
  token: CancellationToken,
  /// The commit gate. Teardown holds it while cancelling, so a commit either
  /// completes before teardown or never happens.
  tasks: Mutex<Vec<AbortHandle>>,
  cache: LookupCache,
}

/// Shared access to a scope, for tasks running inside it.
#[derive(Clone)]
pub struct ScopeHandle {
  inner: Arc<ScopeInner>,
}

impl ScopeHandle {
  pub fn is_torn_down(&self) -> bool { self.inner.token.is_cancelled() }

  /// The activation's lookup cache.
  pub fn cache(&self) -> &LookupCache { &self.inner.cache }

  /// Apply a state mutation unless the scope has been torn down.
  ///
  /// `f` runs under the gate lock and must not call `commit` itself.
  pub fn commit<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
    let _gate = self.inner.tasks.lock();
    if self.inner.token.is_cancelled() {
      return Err(Error::Cancelled);
    }
    Ok(f())
  }

  /// Drive `fut` on the current task until it finishes or the scope is torn
  /// down, whichever comes first.
  pub async fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
      biased;
      _ = self.inner.token.cancelled() => Err(Error::Cancelled),
      r = fut => r,
    }
  }

  /// Spawn `fut` as a task owned by this scope.
  ///
  /// The task is aborted at teardown; spawning into a torn-down scope
  /// yields a task that is already aborted.
  pub fn spawn<T, F>(&self, fut: F) -> JoinHandle<Result<T>>
  where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
  {
    let scope = self.clone();
    let mut tasks = self.inner.tasks.lock();
    let handle = tokio::spawn(async move { scope.run(fut).await });
    if self.inner.token.is_cancelled() {
      handle.abort();
    } else {
      tasks.retain(|t| !t.is_finished());
      tasks.push(handle.abort_handle());
    }
    handle
  }

  fn teardown(&self) {
    let mut tasks = self.inner.tasks.lock();
    if self.inner.token.is_cancelled() {
      return;
    }
    self.inner.token.cancel();
    let aborted = tasks.len();
    for task in tasks.drain(..) {
      task.abort();
    }
    self.inner.cache.close();
    debug!(aborted, "view scope torn down");
  }
}

/// Owner of one view activation's scope. Dropping it tears the scope down.
pub struct ViewScope {
  handle: ScopeHandle,
}

impl ViewScope {
  pub fn new(session: &SessionStore) -> Self {
    Self {
      handle: ScopeHandle {
        inner: Arc::new(ScopeInner {
          token: CancellationToken::new(),
          tasks: Mutex::new(Vec::new()),
          cache: LookupCache::new(session.clone()),
        }),
      },
    }
  }

  pub fn handle(&self) -> ScopeHandle { self.handle.clone() }

  /// Cancel outstanding work and close the cache. Idempotent.
  pub fn teardown(&self) { self.handle.teardown() }
}

impl Deref for ViewScope {
  type Target = ScopeHandle;

  fn deref(&self) -> &ScopeHandle { &self.handle }
}

impl Drop for ViewScope {
  fn drop(&mut self) { self.handle.teardown() }
}
