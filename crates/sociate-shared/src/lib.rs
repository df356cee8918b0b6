//! # sociate-shared
//!
//! Domain primitives shared by the store and the HTTP API: media and
//! notification kinds, canonical conversation pairs, wire timestamps and
//! signed identity tokens.

pub mod constants;
pub mod error;
pub mod identity;
pub mod time;
pub mod types;

pub use error::{SharedError, TokenError};
pub use types::{CanonicalPair, MediaKind, NotificationKind};
