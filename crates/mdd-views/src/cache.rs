//! Per-activation lookup cache: foreign id to resolved display value.
//!
//! Entries are stamped with the session epoch they were fetched under. Any
//! session change empties the cache on the next access, and an insert
//! stamped with an older epoch is refused. A closed cache (its activation was
//! torn down) accepts nothing.

use std::collections::HashMap;

use mdd_core::{SubjectId, UserId};
use mdd_session::SessionStore;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Entries {
  epoch:          u64,
  closed:         bool,
  authors:        HashMap<UserId, String>,
  subjects:       HashMap<SubjectId, String>,
  /// Every subject title is known, so a miss means the subject is gone.
  subjects_known: bool,
}

impl Entries {
  fn reset(&mut self) {
    self.authors.clear();
    self.subjects.clear();
    self.subjects_known = false;
  }
}

pub struct LookupCache {
  session: SessionStore,
  entries: Mutex<Entries>,
}

impl LookupCache {
  pub fn new(session: SessionStore) -> Self {
    let epoch = session.epoch();
    Self {
      session,
      entries: Mutex::new(Entries {
        epoch,
        ..Entries::default()
      }),
    }
  }

  /// Stamp to present with a later insert. Take it before the lookup starts.
  pub fn epoch(&self) -> u64 { self.session.epoch() }

  fn entries(&self) -> MutexGuard<'_, Entries> {
    let mut entries = self.entries.lock();
    let now = self.session.epoch();
    if entries.epoch != now {
      debug!(from = entries.epoch, to = now, "session changed; lookup cache invalidated");
      entries.reset();
      entries.epoch = now;
    }
    entries
  }

  pub fn author(&self, id: UserId) -> Option<String> { self.entries().authors.get(&id).cloned() }

  pub fn subject(&self, id: SubjectId) -> Option<String> {
    self.entries().subjects.get(&id).cloned()
  }

  pub fn has_subject_titles(&self) -> bool { self.entries().subjects_known }

  pub fn insert_author(&self, epoch: u64, id: UserId, name: String) -> bool {
    let mut entries = self.entries();
    if entries.closed || entries.epoch != epoch {
      return false;
    }
    entries.authors.insert(id, name);
    true
  }

  /// Replace the subject titles with the complete list.
  pub fn insert_subject_titles(
    &self,
    epoch: u64,
    titles: impl IntoIterator<Item = (SubjectId, String)>,
  ) -> bool {
    let mut entries = self.entries();
    if entries.closed || entries.epoch != epoch {
      return false;
    }
    entries.subjects = titles.into_iter().collect();
    entries.subjects_known = true;
    true
  }

  pub fn len(&self) -> usize {
    let entries = self.entries();
    entries.authors.len() + entries.subjects.len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub(crate) fn close(&self) {
    let mut entries = self.entries.lock();
    entries.closed = true;
    entries.reset();
  }
}
