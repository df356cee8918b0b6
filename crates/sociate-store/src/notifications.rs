//! Notification generation and the read/unread flag.
//!
//! Notifications are written inside the transaction of the mutation that
//! triggers them (follow, like, comment), so an edge never exists without
//! its notification and vice versa.

use rusqlite::{params, Connection};
use uuid::Uuid;

use sociate_shared::{time, NotificationKind};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::{Notification, User};
use crate::sql;

const NOTIFICATION_COLUMNS: &str = "id, receiver_id, kind, actor_id, actor_username, actor_avatar, \
                                    post_id, comment_id, read, created_at";

/// What a new notification points at.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Target<'a> {
    pub post_id: Option<&'a str>,
    pub comment_id: Option<&'a str>,
}

/// Record that `actor` did `kind` to something owned by `receiver_id`.
///
/// Self-actions never notify: returns `Ok(None)` without writing when the
/// actor is the receiver.
pub(crate) fn notify(
    conn: &Connection,
    receiver_id: &str,
    kind: NotificationKind,
    actor: &User,
    target: Target<'_>,
) -> Result<Option<Notification>> {
    if actor.id == receiver_id {
        return Ok(None);
    }

    let notification = Notification {
        id: Uuid::new_v4().to_string(),
        receiver_id: receiver_id.to_string(),
        kind,
        actor_id: actor.id.clone(),
        actor_username: actor.username.clone(),
        actor_avatar: actor.profile_picture.clone().unwrap_or_default(),
        post_id: target.post_id.map(str::to_string),
        comment_id: target.comment_id.map(str::to_string),
        read: false,
        created_at: time::now(),
    };

    conn.execute(
        "INSERT INTO notifications (id, receiver_id, kind, actor_id, actor_username, actor_avatar,
                                    post_id, comment_id, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
        params![
            notification.id,
            notification.receiver_id,
            notification.kind.as_str(),
            notification.actor_id,
            notification.actor_username,
            notification.actor_avatar,
            notification.post_id,
            notification.comment_id,
            notification.created_at.timestamp_millis(),
        ],
    )?;

    tracing::debug!(
        receiver = %notification.receiver_id,
        actor = %notification.actor_id,
        kind = %kind,
        "notification recorded"
    );

    Ok(Some(notification))
}

impl Database {
    /// Newest-first notifications for `receiver_id`.
    pub fn notifications_for_user(&self, receiver_id: &str, limit: u32) -> Result<Vec<Notification>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE receiver_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![receiver_id, limit], row_to_notification)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    pub fn get_notification(&self, id: &str) -> Result<Notification> {
        self.conn()
            .query_row(
                &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
                params![id],
                row_to_notification,
            )
            .map_err(not_found("Notification"))
    }

    pub fn unread_notification_count(&self, receiver_id: &str) -> Result<u64> {
        let n: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM notifications WHERE receiver_id = ?1 AND read = 0",
            params![receiver_id],
            |row| row.get(0),
        )?;
        Ok(n.max(0) as u64)
    }

    /// Flip one notification to read. Returns `false` if it does not exist.
    /// Marking an already-read notification is a successful no-op.
    pub fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("UPDATE notifications SET read = 1 WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Mark every unread notification of `receiver_id` as read. Returns how
    /// many flipped.
    pub fn mark_all_notifications_read(&self, receiver_id: &str) -> Result<usize> {
        let affected = self.conn().execute(
            "UPDATE notifications SET read = 1 WHERE receiver_id = ?1 AND read = 0",
            params![receiver_id],
        )?;
        Ok(affected)
    }
}

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let kind_str: String = row.get(2)?;
    let kind = kind_str.parse::<NotificationKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let read: i64 = row.get(8)?;

    Ok(Notification {
        id: row.get(0)?,
        receiver_id: row.get(1)?,
        kind,
        actor_id: row.get(3)?,
        actor_username: row.get(4)?,
        actor_avatar: row.get(5)?,
        post_id: row.get(6)?,
        comment_id: row.get(7)?,
        read: read != 0,
        created_at: sql::timestamp(row, 9)?,
    })
}
