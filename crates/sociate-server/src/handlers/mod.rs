//! Route handlers, one module per resource.

pub mod conversations;
pub mod follows;
pub mod notifications;
pub mod posts;
pub mod users;
