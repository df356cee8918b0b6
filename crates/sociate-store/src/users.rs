//! CRUD and profile aggregates for [`User`] records.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, OptionalExtension};

use sociate_shared::time;

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::{User, UserCounts, UserSync};
use crate::sql;

pub(crate) const USER_COLUMNS: &str =
    "id, username, name, email, nickname, dob, address, bio, profile_picture, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Upsert
    // ------------------------------------------------------------------

    /// Insert the user or update every mutable field of an existing row.
    ///
    /// Repeating the same sync leaves the row unchanged; `created_at` is
    /// only ever set by the first sync. Fails with [`StoreError::Conflict`]
    /// when the username belongs to another user.
    pub fn upsert_user(&self, input: &UserSync) -> Result<User> {
        let tx = self.write_transaction()?;

        let owner: Option<String> = tx
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![input.username],
                |row| row.get(0),
            )
            .optional()?;
        if owner.as_deref().is_some_and(|id| id != input.id) {
            return Err(StoreError::Conflict("Username already taken".into()));
        }

        let updated = tx.execute(
            "UPDATE users
             SET username = ?2, name = ?3, email = ?4, nickname = ?5, dob = ?6,
                 address = ?7, bio = ?8, profile_picture = ?9
             WHERE id = ?1",
            params![
                input.id,
                input.username,
                input.name,
                input.email,
                input.nickname,
                input.dob,
                input.address,
                input.bio,
                input.profile_picture,
            ],
        );
        let updated = match updated {
            Ok(n) => n,
            Err(e) if sql::is_constraint_violation(&e) => {
                return Err(StoreError::Conflict("Username already taken".into()))
            }
            Err(e) => return Err(e.into()),
        };

        if updated == 0 {
            let inserted = tx.execute(
                "INSERT INTO users (id, username, name, email, nickname, dob, address, bio,
                                    profile_picture, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    input.id,
                    input.username,
                    input.name,
                    input.email,
                    input.nickname,
                    input.dob,
                    input.address,
                    input.bio,
                    input.profile_picture,
                    time::now().timestamp_millis(),
                ],
            );
            match inserted {
                Ok(_) => tracing::info!(user = %input.id, "user created"),
                Err(e) if sql::is_constraint_violation(&e) => {
                    return Err(StoreError::Conflict("Username already taken".into()))
                }
                Err(e) => return Err(e.into()),
            }
        }

        let user = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![input.id],
                row_to_user,
            )
            .map_err(not_found("User"))?;

        tx.commit()?;
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_user(&self, id: &str) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .map_err(not_found("User"))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                row_to_user,
            )
            .map_err(not_found("User"))
    }

    pub fn user_exists(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Follower, following and post counts, computed at call time.
    pub fn user_counts(&self, id: &str) -> Result<UserCounts> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = self.conn().query_row(sql, params![id], |row| row.get(0))?;
            Ok(n.max(0) as u64)
        };

        Ok(UserCounts {
            followers: count("SELECT COUNT(*) FROM follows WHERE following_id = ?1")?,
            following: count("SELECT COUNT(*) FROM follows WHERE follower_id = ?1")?,
            posts: count("SELECT COUNT(*) FROM posts WHERE author_id = ?1")?,
        })
    }

    /// Case-insensitive substring match on username, name and nickname.
    ///
    /// Returns the first `limit` matches in insertion order; there is no
    /// relevance ranking.
    pub fn search_users(&self, query: &str, limit: u32) -> Result<Vec<User>> {
        let pattern = sql::like_pattern(query);
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE username LIKE ?1 ESCAPE '\\'
                OR name LIKE ?1 ESCAPE '\\'
                OR nickname LIKE ?1 ESCAPE '\\'
             ORDER BY rowid ASC
             LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![pattern, limit], row_to_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Batch lookup keyed by id. Unknown ids are simply absent from the map.
    pub fn users_by_ids(&self, ids: &[String]) -> Result<HashMap<String, User>> {
        let mut map = HashMap::with_capacity(ids.len());
        if ids.is_empty() {
            return Ok(map);
        }

        for chunk in ids.chunks(sql::BATCH_SIZE) {
            let mut stmt = self.conn().prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id IN ({})",
                sql::placeholders(1, chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_user)?;
            for row in rows {
                let user = row?;
                map.insert(user.id.clone(), user);
            }
        }
        Ok(map)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a row selected with [`USER_COLUMNS`] to a [`User`].
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        nickname: row.get(4)?,
        dob: row.get(5)?,
        address: row.get(6)?,
        bio: row.get(7)?,
        profile_picture: row.get(8)?,
        created_at: sql::timestamp(row, 9)?,
    })
}
