use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown media type: {0} (expected image or video)")]
    InvalidMediaKind(String),

    #[error("Unknown notification type: {0}")]
    InvalidNotificationKind(String),

    #[error("Invalid conversation pair: {0}")]
    InvalidPair(&'static str),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed identity token")]
    Malformed,

    #[error("Identity token expired")]
    Expired,

    #[error("Invalid identity token signature")]
    BadSignature,

    #[error("Invalid issuer key")]
    InvalidIssuerKey,
}
