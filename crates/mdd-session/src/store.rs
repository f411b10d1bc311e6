//! [`SessionStore`]: the principal and token, persisted and broadcast.
//!
//! Every write bumps a generation counter. Callers that start a round trip
//! whose outcome will be written back (a login, an authenticated request
//! that may come back 401) take a [`Generation`] ticket first and present it
//! with the write, so a late completion cannot undo a newer logout or clear
//! a newer login.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use futures::stream::{self, Stream};
use mdd_core::{
  Result,
  api::SessionPersistence,
  principal::{Principal, Session},
  token::TokenClaims,
};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Snapshot of the write counter, taken before a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

struct WriteLog {
  generation: u64,
  /// Generation assigned to the most recent `clear`/`expire`.
  last_clear: u64,
}

struct Inner {
  persistence: Arc<dyn SessionPersistence>,
  tx:          watch::Sender<Option<Session>>,
  /// Mirror of `WriteLog::generation` for lock-free reads.
  epoch:       AtomicU64,
  writes:      Mutex<WriteLog>,
}

/// Shared handle to the session. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
  inner: Arc<Inner>,
}

impl SessionStore {
  fn with_initial(persistence: Arc<dyn SessionPersistence>, initial: Option<Session>) -> Self {
    let (tx, _rx) = watch::channel(initial);
    Self {
      inner: Arc::new(Inner {
        persistence,
        tx,
        epoch: AtomicU64::new(0),
        writes: Mutex::new(WriteLog {
          generation: 0,
          last_clear: 0,
        }),
      }),
    }
  }

  /// An empty store over `persistence`, ignoring anything already persisted.
  pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
    Self::with_initial(persistence, None)
  }

  /// Load the persisted pair, if any, at process start.
  ///
  /// A half-present pair or a token past its `exp` claim is erased and the
  /// store starts empty.
  pub async fn restore(persistence: Arc<dyn SessionPersistence>) -> Result<Self> {
    let persisted = persistence.load().await?;
    if persisted.is_empty() {
      return Ok(Self::new(persistence));
    }

    let Some(session) = persisted.into_session() else {
      warn!("persisted session is missing its principal or token; discarding");
      persistence.clear().await?;
      return Ok(Self::new(persistence));
    };

    let expired = TokenClaims::decode(&session.token)
      .is_some_and(|claims| claims.is_expired_at(Utc::now()));
    if expired {
      info!(user = %session.principal.id, "persisted token has expired; discarding");
      persistence.clear().await?;
      return Ok(Self::new(persistence));
    }

    debug!(user = %session.principal.id, "restored persisted session");
    Ok(Self::with_initial(persistence, Some(session)))
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The latest session snapshot. Never blocks.
  pub fn current(&self) -> Option<Session> { self.inner.tx.borrow().clone() }

  pub fn principal(&self) -> Option<Principal> {
    self.inner.tx.borrow().as_ref().map(|s| s.principal.clone())
  }

  pub fn token(&self) -> Option<String> {
    self.inner.tx.borrow().as_ref().map(|s| s.token.clone())
  }

  pub fn is_authenticated(&self) -> bool { self.inner.tx.borrow().is_some() }

  /// Number of writes applied so far. Changes whenever the session does.
  pub fn epoch(&self) -> u64 { self.inner.epoch.load(Ordering::SeqCst) }

  /// Take a ticket to present with a later [`set_session`](Self::set_session)
  /// or [`expire`](Self::expire).
  pub fn ticket(&self) -> Generation { Generation(self.epoch()) }

  /// Subscribe to session changes; the current state is replayed first.
  pub fn observe(&self) -> SessionObserver {
    SessionObserver {
      rx:       self.inner.tx.subscribe(),
      replayed: false,
    }
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist and broadcast `session`.
  ///
  /// Returns `Ok(false)` without writing anything if a `clear` happened after
  /// `ticket` was taken. A persistence failure leaves the session unchanged.
  pub async fn set_session(&self, ticket: Generation, session: Session) -> Result<bool> {
    let mut log = self.inner.writes.lock().await;
    if ticket.0 < log.last_clear {
      debug!(
        ticket = ticket.0,
        last_clear = log.last_clear,
        "discarding stale session write"
      );
      return Ok(false);
    }

    self.inner.persistence.save(&session).await?;

    log.generation += 1;
    self.inner.epoch.store(log.generation, Ordering::SeqCst);
    info!(user = %session.principal.id, generation = log.generation, "session established");
    self.inner.tx.send_replace(Some(session));
    Ok(true)
  }

  /// Erase the persisted pair and broadcast the empty session.
  ///
  /// The in-memory session is cleared even if erasing the persisted pair
  /// fails; that failure is returned afterwards.
  pub async fn clear(&self) -> Result<()> {
    let mut log = self.inner.writes.lock().await;
    self.clear_locked(&mut log).await
  }

  /// Forced logout after an authorization failure.
  ///
  /// Only clears if nothing was written since `ticket`, i.e. the refused
  /// request was sent with the token that is still current.
  pub async fn expire(&self, ticket: Generation) -> Result<bool> {
    let mut log = self.inner.writes.lock().await;
    let signed_in = self.is_authenticated();
    if ticket.0 != log.generation || !signed_in {
      debug!(ticket = ticket.0, generation = log.generation, "ignoring stale expiry");
      return Ok(false);
    }
    warn!("server refused the session token; logging out");
    self.clear_locked(&mut log).await?;
    Ok(true)
  }

  async fn clear_locked(&self, log: &mut WriteLog) -> Result<()> {
    let erased = self.inner.persistence.clear().await;

    log.generation += 1;
    log.last_clear = log.generation;
    self.inner.epoch.store(log.generation, Ordering::SeqCst);
    self.inner.tx.send_if_modified(|s| s.take().is_some());
    debug!(generation = log.generation, "session cleared");

    if let Err(e) = &erased {
      warn!("failed to erase persisted session: {e}");
    }
    erased
  }
}

// ─── Observer ────────────────────────────────────────────────────────────────

/// A replay-latest subscription to the session.
///
/// The first [`next`](Self::next) resolves immediately with the current
/// state; later calls wait for a change. Rapid successive writes may be
/// coalesced into their final state.
pub struct SessionObserver {
  rx:       watch::Receiver<Option<Session>>,
  replayed: bool,
}

impl SessionObserver {
  /// The next session state, or `None` once the store has been dropped.
  pub async fn next(&mut self) -> Option<Option<Session>> {
    if self.replayed {
      self.rx.changed().await.ok()?;
    }
    self.replayed = true;
    Some(self.rx.borrow_and_update().clone())
  }

  pub fn into_stream(self) -> impl Stream<Item = Option<Session>> {
    stream::unfold(self, |mut obs| async move { obs.next().await.map(|s| (s, obs)) })
  }
}
