//! Direct conversations, one row per unordered pair of users.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, OptionalExtension};
use uuid::Uuid;

use sociate_shared::{time, CanonicalPair};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::messages::{row_to_message, MESSAGE_COLUMNS};
use crate::models::{Conversation, Message};
use crate::sql;

const CONVERSATION_COLUMNS: &str = "id, user_a_id, user_b_id, created_at";

impl Database {
    /// Return the conversation for `pair`, creating it if needed. The flag
    /// is `true` when this call created the row. The lookup and insert share
    /// one write lock, so racing callers all land on the same row.
    pub fn get_or_create_conversation(&self, pair: &CanonicalPair) -> Result<(Conversation, bool)> {
        let tx = self.write_transaction()?;

        if let Some(existing) = find_by_pair(&tx, pair)? {
            return Ok((existing, false));
        }

        for user_id in [pair.first(), pair.second()] {
            tx.query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get::<_, i64>(0),
            )
            .map_err(not_found("User"))?;
        }

        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            user_a_id: pair.first().to_string(),
            user_b_id: pair.second().to_string(),
            created_at: time::now(),
        };

        tx.execute(
            "INSERT INTO conversations (id, user_a_id, user_b_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                conversation.id,
                conversation.user_a_id,
                conversation.user_b_id,
                conversation.created_at.timestamp_millis(),
            ],
        )?;
        tx.commit()?;

        tracing::info!(
            conversation = %conversation.id,
            a = %conversation.user_a_id,
            b = %conversation.user_b_id,
            "conversation created"
        );
        Ok((conversation, true))
    }

    pub fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.conn()
            .query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                row_to_conversation,
            )
            .map_err(not_found("Conversation"))
    }

    /// Conversations `user_id` takes part in, newest first.
    pub fn conversations_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations
             WHERE user_a_id = ?1 OR user_b_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_conversation)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// The latest message of each conversation in `conversation_ids`.
    /// Conversations without messages are absent from the map.
    pub fn last_messages(&self, conversation_ids: &[String]) -> Result<HashMap<String, Message>> {
        let mut map = HashMap::new();
        if conversation_ids.is_empty() {
            return Ok(map);
        }

        for chunk in conversation_ids.chunks(sql::BATCH_SIZE) {
            let mut stmt = self.conn().prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m
                 WHERE m.conversation_id IN ({})
                   AND m.rowid = (
                       SELECT rowid FROM messages
                       WHERE conversation_id = m.conversation_id
                       ORDER BY created_at DESC, rowid DESC
                       LIMIT 1
                   )",
                sql::placeholders(1, chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_message)?;
            for row in rows {
                let message = row?;
                map.insert(message.conversation_id.clone(), message);
            }
        }
        Ok(map)
    }
}

fn find_by_pair(conn: &rusqlite::Connection, pair: &CanonicalPair) -> Result<Option<Conversation>> {
    conn.query_row(
        &format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations
             WHERE user_a_id = ?1 AND user_b_id = ?2"
        ),
        params![pair.first(), pair.second()],
        row_to_conversation,
    )
    .optional()
    .map_err(StoreError::Sqlite)
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_a_id: row.get(1)?,
        user_b_id: row.get(2)?,
        created_at: sql::timestamp(row, 3)?,
    })
}
