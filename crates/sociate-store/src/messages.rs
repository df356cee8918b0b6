//! Direct messages inside a conversation, paged newest-first.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use sociate_shared::{time, MediaKind};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Message;
use crate::sql;

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, content, media_url, media_type, created_at";

impl Database {
    /// Append a message to `conversation_id`. The sender must be one of the
    /// two participants and the message needs text or media.
    pub fn create_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        content: Option<&str>,
        media_url: Option<&str>,
        media_kind: Option<MediaKind>,
    ) -> Result<Message> {
        if content.is_none() && media_url.is_none() {
            return Err(StoreError::Invalid("Message needs content or media"));
        }

        let conversation = self.get_conversation(conversation_id)?;
        if !conversation.has_participant(sender_id) {
            return Err(StoreError::Forbidden("Sender is not a participant"));
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            content: content.map(str::to_string),
            media_url: media_url.map(str::to_string),
            media_kind,
            created_at: time::now(),
        };

        self.conn().execute(
            "INSERT INTO messages (id, conversation_id, sender_id, content, media_url, media_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                message.id,
                message.conversation_id,
                message.sender_id,
                message.content,
                message.media_url,
                message.media_kind.map(|k| k.as_str()),
                message.created_at.timestamp_millis(),
            ],
        )?;

        tracing::debug!(message = %message.id, conversation = %conversation_id, "message stored");
        Ok(message)
    }

    /// Up to `limit` messages of a conversation, oldest first.
    ///
    /// Without `before` this is the tail of the history. With `before` only
    /// messages strictly older than it are considered.
    pub fn messages_page(
        &self,
        conversation_id: &str,
        limit: u32,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>> {
        self.get_conversation(conversation_id)?;

        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE conversation_id = ?1
               AND (?2 IS NULL OR created_at < ?2)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?3"
        ))?;

        let rows = stmt.query_map(
            params![
                conversation_id,
                before.map(|ts| ts.timestamp_millis()),
                limit
            ],
            row_to_message,
        )?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        messages.reverse();
        Ok(messages)
    }
}

pub(crate) fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        media_url: row.get(4)?,
        media_kind: sql::media_kind(row, 5)?,
        created_at: sql::timestamp(row, 6)?,
    })
}
