/// Application name
pub const APP_NAME: &str = "Sociate";

/// Maximum posts returned by a feed read (global or personal)
pub const FEED_LIMIT: u32 = 50;

/// Maximum users returned by a search
pub const SEARCH_LIMIT: u32 = 20;

/// Default page size for message history
pub const DEFAULT_MESSAGE_LIMIT: u32 = 50;

/// Upper bound a client may request for one page of message history
pub const MAX_MESSAGE_LIMIT: u32 = 200;

/// Default page size for notification listings
pub const NOTIFICATION_LIMIT: u32 = 100;

/// `max-age` advertised on profile, comment and feed reads (seconds)
pub const SHORT_CACHE_MAX_AGE_SECS: u32 = 5;

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 8787;

/// Default request body limit in bytes (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
