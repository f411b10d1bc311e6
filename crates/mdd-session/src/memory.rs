//! In-memory [`SessionPersistence`], used by tests and `--ephemeral` runs.

use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::{BoxFuture, FutureExt as _};
use mdd_core::{
  Error, Result,
  api::{PersistedSession, SessionPersistence},
  principal::Session,
};
use parking_lot::Mutex;

#[derive(Default)]
pub struct MemoryPersistence {
  entries:     Mutex<PersistedSession>,
  fail_writes: AtomicBool,
}

impl MemoryPersistence {
  pub fn new() -> Self { Self::default() }

  /// Start with whatever entries are given, including a half-present pair.
  pub fn with_entries(entries: PersistedSession) -> Self {
    Self {
      entries:     Mutex::new(entries),
      fail_writes: AtomicBool::new(false),
    }
  }

  /// Make every subsequent `save`/`clear` fail, to exercise error paths.
  pub fn set_fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

  pub fn snapshot(&self) -> PersistedSession { self.entries.lock().clone() }

  fn check_writable(&self) -> Result<()> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(Error::Persistence("memory persistence is read-only".into()));
    }
    Ok(())
  }
}

impl SessionPersistence for MemoryPersistence {
  fn load(&self) -> BoxFuture<'_, Result<PersistedSession>> {
    let entries = self.snapshot();
    async move { Ok(entries) }.boxed()
  }

  fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<()>> {
    async move {
      self.check_writable()?;
      *self.entries.lock() = PersistedSession {
        principal: Some(session.principal.clone()),
        token:     Some(session.token.clone()),
      };
      Ok(())
    }
    .boxed()
  }

  fn clear(&self) -> BoxFuture<'_, Result<()>> {
    async move {
      self.check_writable()?;
      *self.entries.lock() = PersistedSession::default();
      Ok(())
    }
    .boxed()
  }
}
