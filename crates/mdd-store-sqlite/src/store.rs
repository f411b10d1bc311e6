//! [`SqlitePersistence`]: the SQLite implementation of [`SessionPersistence`].

use std::path::Path;

use futures::future::{BoxFuture, FutureExt as _};
use mdd_core::{
  api::{PersistedSession, SessionPersistence},
  principal::Session,
};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{
  Result,
  encode::{decode_principal, encode_principal},
  schema::{PRINCIPAL_KEY, SCHEMA, TOKEN_KEY},
};

/// Session entries backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqlitePersistence {
  conn: tokio_rusqlite::Connection,
}

impl SqlitePersistence {
  /// Open (or create) the database at `path`, creating parent directories.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory database, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn load_entries(&self) -> Result<PersistedSession> {
    let (principal, token): (Option<String>, Option<String>) = self
      .conn
      .call(|conn| {
        let get = |key: &str| {
          conn
            .query_row(
              "SELECT value FROM session_entries WHERE key = ?1",
              rusqlite::params![key],
              |r| r.get::<_, String>(0),
            )
            .optional()
        };
        Ok((get(PRINCIPAL_KEY)?, get(TOKEN_KEY)?))
      })
      .await?;

    Ok(PersistedSession {
      principal: principal.as_deref().map(decode_principal).transpose()?,
      token,
    })
  }

  /// Replace both entries in one transaction.
  pub async fn save_entries(&self, session: &Session) -> Result<()> {
    let principal = encode_principal(&session.principal)?;
    let token = session.token.clone();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR REPLACE INTO session_entries (key, value) VALUES (?1, ?2)",
          rusqlite::params![PRINCIPAL_KEY, principal],
        )?;
        tx.execute(
          "INSERT OR REPLACE INTO session_entries (key, value) VALUES (?1, ?2)",
          rusqlite::params![TOKEN_KEY, token],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    debug!("persisted session entries");
    Ok(())
  }

  /// Erase both entries in one statement.
  pub async fn clear_entries(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute(
          "DELETE FROM session_entries WHERE key IN (?1, ?2)",
          rusqlite::params![PRINCIPAL_KEY, TOKEN_KEY],
        )?;
        Ok(())
      })
      .await?;
    debug!("erased session entries");
    Ok(())
  }

  /// Write a single raw entry, bypassing the pairing rule.
  #[cfg(test)]
  pub(crate) async fn put_raw(&self, key: &'static str, value: &str) -> Result<()> {
    let value = value.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO session_entries (key, value) VALUES (?1, ?2)",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl SessionPersistence for SqlitePersistence {
  fn load(&self) -> BoxFuture<'_, mdd_core::Result<PersistedSession>> {
    async move { Ok(self.load_entries().await?) }.boxed()
  }

  fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, mdd_core::Result<()>> {
    async move { Ok(self.save_entries(session).await?) }.boxed()
  }

  fn clear(&self) -> BoxFuture<'_, mdd_core::Result<()>> {
    async move { Ok(self.clear_entries().await?) }.boxed()
  }
}
