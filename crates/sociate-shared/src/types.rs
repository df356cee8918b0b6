use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharedError;

/// Kind of media attached to a post or message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl FromStr for MediaKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(SharedError::InvalidMediaKind(other.to_string())),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Follow => "follow",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "comment" => Ok(Self::Comment),
            "follow" => Ok(Self::Follow),
            other => Err(SharedError::InvalidNotificationKind(other.to_string())),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two participants of a direct conversation, sorted so that the
/// lexicographically smaller id always comes first.
///
/// `CanonicalPair::new(a, b) == CanonicalPair::new(b, a)` for any two
/// distinct ids, which is what lets a pair of users address exactly one
/// conversation row regardless of who starts it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPair {
    first: String,
    second: String,
}

impl CanonicalPair {
    pub fn new(a: &str, b: &str) -> Result<Self, SharedError> {
        if a.is_empty() || b.is_empty() {
            return Err(SharedError::InvalidPair("participant id is empty"));
        }
        if a == b {
            return Err(SharedError::InvalidPair("participants must differ"));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self {
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}
