//! The follow graph: directed `(follower, following)` edges.

use rusqlite::params;

use sociate_shared::{time, NotificationKind};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::{EdgeOutcome, User};
use crate::notifications::{self, Target};
use crate::users::{row_to_user, USER_COLUMNS};

const JOINED_USER_COLUMNS: &str = "u.id, u.username, u.name, u.email, u.nickname, u.dob, \
                                   u.address, u.bio, u.profile_picture, u.created_at";

impl Database {
    /// Add the edge `follower_id -> following_id` and notify the followed
    /// user, in one transaction.
    ///
    /// Repeating an existing follow is a successful no-op and produces no
    /// second notification.
    pub fn follow(&self, follower_id: &str, following_id: &str) -> Result<EdgeOutcome> {
        if follower_id == following_id {
            return Err(StoreError::Invalid("Cannot follow yourself"));
        }

        let tx = self.write_transaction()?;

        let follower = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![follower_id],
                row_to_user,
            )
            .map_err(not_found("User"))?;
        tx.query_row(
            "SELECT 1 FROM users WHERE id = ?1",
            params![following_id],
            |row| row.get::<_, i64>(0),
        )
        .map_err(not_found("User"))?;

        // The primary key makes the insert itself idempotent; the row count
        // tells us whether this call created the edge.
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![follower_id, following_id, time::now().timestamp_millis()],
        )?;

        if inserted == 0 {
            tracing::debug!(follower = %follower_id, following = %following_id, "already following");
            return Ok(EdgeOutcome::AlreadyExisted);
        }

        notifications::notify(
            &tx,
            following_id,
            NotificationKind::Follow,
            &follower,
            Target::default(),
        )?;
        tx.commit()?;

        tracing::info!(follower = %follower_id, following = %following_id, "follow created");
        Ok(EdgeOutcome::Created)
    }

    /// Remove the edge. Returns `true` if one was deleted; a missing edge is
    /// not an error.
    pub fn unfollow(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
            params![follower_id, following_id],
        )?;
        Ok(affected > 0)
    }

    /// Users following `user_id`.
    pub fn list_followers(&self, user_id: &str) -> Result<Vec<User>> {
        self.users_joined(
            &format!(
                "SELECT {JOINED_USER_COLUMNS} FROM users u
                 INNER JOIN follows f ON u.id = f.follower_id
                 WHERE f.following_id = ?1"
            ),
            user_id,
        )
    }

    /// Users `user_id` follows.
    pub fn list_following(&self, user_id: &str) -> Result<Vec<User>> {
        self.users_joined(
            &format!(
                "SELECT {JOINED_USER_COLUMNS} FROM users u
                 INNER JOIN follows f ON u.id = f.following_id
                 WHERE f.follower_id = ?1"
            ),
            user_id,
        )
    }

    fn users_joined(&self, sql: &str, user_id: &str) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params![user_id], row_to_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}
