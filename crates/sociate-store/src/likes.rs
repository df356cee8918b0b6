//! Post likes: one row per (user, post).

use std::collections::HashMap;

use rusqlite::{params, params_from_iter};

use sociate_shared::{time, NotificationKind};

use crate::database::Database;
use crate::error::{not_found, Result};
use crate::models::EdgeOutcome;
use crate::notifications::{self, Target};
use crate::sql;
use crate::users::{row_to_user, USER_COLUMNS};

impl Database {
    /// Like `post_id` as `user_id`. Notifies the post author unless they are
    /// liking their own post. A repeated like is a no-op.
    pub fn like_post(&self, post_id: &str, user_id: &str) -> Result<EdgeOutcome> {
        let tx = self.write_transaction()?;

        let author_id: String = tx
            .query_row(
                "SELECT author_id FROM posts WHERE id = ?1",
                params![post_id],
                |row| row.get(0),
            )
            .map_err(not_found("Post"))?;
        let liker = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                row_to_user,
            )
            .map_err(not_found("User"))?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, post_id, time::now().timestamp_millis()],
        )?;
        if inserted == 0 {
            return Ok(EdgeOutcome::AlreadyExisted);
        }

        notifications::notify(
            &tx,
            &author_id,
            NotificationKind::Like,
            &liker,
            Target {
                post_id: Some(post_id),
                comment_id: None,
            },
        )?;
        tx.commit()?;

        tracing::debug!(post = %post_id, user = %user_id, "post liked");
        Ok(EdgeOutcome::Created)
    }

    /// Remove a like. The post must exist; a missing like is not an error.
    pub fn unlike_post(&self, post_id: &str, user_id: &str) -> Result<bool> {
        self.get_post(post_id)?;
        let affected = self.conn().execute(
            "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
            params![user_id, post_id],
        )?;
        Ok(affected > 0)
    }

    /// Liking user ids per post, in like order. Posts without likes are
    /// absent from the map.
    pub fn likes_for_posts(&self, post_ids: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(map);
        }

        // A post's likes always come from a single chunk, so per-post order
        // holds across chunks.
        for chunk in post_ids.chunks(sql::BATCH_SIZE) {
            let mut stmt = self.conn().prepare(&format!(
                "SELECT post_id, user_id FROM likes
                 WHERE post_id IN ({})
                 ORDER BY created_at ASC, rowid ASC",
                sql::placeholders(1, chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (post_id, user_id) = row?;
                map.entry(post_id).or_default().push(user_id);
            }
        }
        Ok(map)
    }
}
