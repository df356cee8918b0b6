//! Who sees what.
//!
//! Anonymous readers get the most recent public posts. A signed-in viewer
//! gets the most recent posts by themselves and everyone they follow.

use sociate_shared::constants::FEED_LIMIT;
use sociate_store::Post;

use crate::db::StoreHandle;
use crate::error::ApiError;

/// Newest-first feed rows for `viewer`, at most [`FEED_LIMIT`].
pub async fn load(store: &StoreHandle, viewer: Option<String>) -> Result<Vec<Post>, ApiError> {
    store
        .run(move |db| match viewer {
            None => db.recent_posts(FEED_LIMIT),
            Some(viewer) => db.feed_posts(&viewer, FEED_LIMIT),
        })
        .await
}
