//! # sociate-store
//!
//! Relational storage for the Sociate backend, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD and batch-lookup helpers
//! for every table. Mutations that touch more than one row (an edge plus its
//! notification, a user sync, a conversation get-or-create) run inside a
//! single transaction.

pub mod comments;
pub mod conversations;
pub mod database;
pub mod follows;
pub mod likes;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod notifications;
pub mod posts;
pub mod users;

mod error;
mod sql;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use sociate_shared::{MediaKind, NotificationKind};
