//! Durable key-value store contracts and implementations.
//!
//! # Responsibility
//! - Provide raw string load/save by key over SQLite (`kv_entries`).
//! - Provide an in-process store used as fallback and in tests.
//!
//! # Invariants
//! - `save_raw` replaces the whole value for a key (last write wins).
//! - SQLite stores only accept connections migrated to the latest schema.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for key-value access and record encoding.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Codec(serde_json::Error),
    /// Connection schema is not at the version this binary writes.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "board record codec failed: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

/// Durable string-valued key-value surface.
pub trait KvStore {
    /// Returns the stored value, or `None` when the key was never written.
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()>;
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).load_raw(key)
    }

    fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()> {
        (**self).save_raw(key, value)
    }
}

/// SQLite-backed key-value store.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(&conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }
}

impl KvStore for SqliteKvStore {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-process key-value store. Contents die with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one raw entry, e.g. to simulate previously persisted state.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save_raw(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Opens the durable store at `path`, degrading to memory when unavailable.
///
/// The board must stay usable without storage, so an open failure is logged
/// and replaced by a `MemoryKvStore` instead of being returned.
pub fn open_store(path: impl AsRef<Path>) -> Box<dyn KvStore + Send> {
    let path = path.as_ref();
    match SqliteKvStore::open(path) {
        Ok(store) => {
            info!("event=store_open module=repo status=ok backend=sqlite");
            Box::new(store)
        }
        Err(err) => {
            error!(
                "event=store_open module=repo status=error backend=sqlite fallback=memory error={}",
                err
            );
            Box::new(MemoryKvStore::new())
        }
    }
}
