//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.
//!
//! A `Database` is cheap to open and is not shared between requests: the API
//! opens one per unit of work, so all cross-request state lives in the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{Result, StoreError};
use crate::migrations;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Default database location in the platform data directory:
    /// - Linux:   `~/.local/share/sociate/sociate.db`
    /// - macOS:   `~/Library/Application Support/app.sociate.sociate/sociate.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\sociate\sociate\data\sociate.db`
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("app", "sociate", "sociate").ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().join("sociate.db"))
    }

    /// Create the parent directory if needed, open the database and bring the
    /// schema up to date. Called once at startup.
    pub fn init(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(path = %path.display(), "opening database");

        Self::open_at(path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed helpers, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction that holds the write lock from its first
    /// statement. Mutations that read before they write must use this: a
    /// deferred transaction upgrading to a writer under WAL fails with
    /// `SQLITE_BUSY` at once instead of waiting out [`BUSY_TIMEOUT`].
    pub(crate) fn write_transaction(&self) -> Result<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
