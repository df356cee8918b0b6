use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced row does not exist. Carries a human-readable subject,
    /// e.g. `"User"` or `"Post"`.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Input breaks a rule the schema enforces (self-follow, empty message).
    #[error("{0}")]
    Invalid(&'static str),

    /// The acting user is not allowed to touch this row.
    #[error("{0}")]
    Forbidden(&'static str),

    /// A write would break a uniqueness rule the store enforces.
    #[error("{0}")]
    Conflict(String),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Map "no rows" onto [`StoreError::NotFound`] for single-row lookups.
pub(crate) fn not_found(subject: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(subject),
        other => StoreError::Sqlite(other),
    }
}
