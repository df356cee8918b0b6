//! Async access to the synchronous store.
//!
//! Each unit of work opens its own connection on the blocking pool, so
//! requests never share a `rusqlite::Connection` and independent lookups can
//! run side by side. SQLite in WAL mode serializes the writers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sociate_store::{Database, StoreError};

use crate::error::ApiError;

#[derive(Clone)]
pub struct StoreHandle {
    path: Arc<PathBuf>,
}

impl StoreHandle {
    /// The database at `path` must already be initialized.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a fresh connection on the blocking thread pool.
    pub async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<T, StoreError> {
            let db = Database::open_at(&path)?;
            f(&db)
        })
        .await?;

        result.map_err(ApiError::from)
    }
}
