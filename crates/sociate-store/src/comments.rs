//! Append-only comments on posts.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter};
use uuid::Uuid;

use sociate_shared::{time, NotificationKind};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::Comment;
use crate::notifications::{self, Target};
use crate::sql;
use crate::users::{row_to_user, USER_COLUMNS};

const COMMENT_COLUMNS: &str = "id, post_id, author_id, content, created_at";

impl Database {
    /// Append a comment and notify the post author (unless commenting on
    /// their own post), in one transaction.
    pub fn create_comment(&self, post_id: &str, author_id: &str, content: &str) -> Result<Comment> {
        let tx = self.write_transaction()?;

        let post_author: String = tx
            .query_row(
                "SELECT author_id FROM posts WHERE id = ?1",
                params![post_id],
                |row| row.get(0),
            )
            .map_err(not_found("Post"))?;
        let author = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![author_id],
                row_to_user,
            )
            .map_err(not_found("User"))?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at: time::now(),
        };

        tx.execute(
            "INSERT INTO comments (id, post_id, author_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.id,
                comment.post_id,
                comment.author_id,
                comment.content,
                comment.created_at.timestamp_millis(),
            ],
        )?;

        notifications::notify(
            &tx,
            &post_author,
            NotificationKind::Comment,
            &author,
            Target {
                post_id: Some(post_id),
                comment_id: Some(&comment.id),
            },
        )?;
        tx.commit()?;

        tracing::info!(comment = %comment.id, post = %post_id, "comment created");
        Ok(comment)
    }

    /// Comments on one post, oldest first.
    pub fn comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE post_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt.query_map(params![post_id], row_to_comment)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Comments grouped per post, each group oldest first.
    pub fn comments_for_posts(&self, post_ids: &[String]) -> Result<HashMap<String, Vec<Comment>>> {
        let mut map: HashMap<String, Vec<Comment>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(map);
        }

        for chunk in post_ids.chunks(sql::BATCH_SIZE) {
            let mut stmt = self.conn().prepare(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments
                 WHERE post_id IN ({})
                 ORDER BY created_at ASC, rowid ASC",
                sql::placeholders(1, chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_comment)?;
            for row in rows {
                let comment = row?;
                map.entry(comment.post_id.clone()).or_default().push(comment);
            }
        }
        Ok(map)
    }
}

fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        created_at: sql::timestamp(row, 4)?,
    })
}
