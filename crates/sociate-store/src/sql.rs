//! Row-mapping helpers shared by the per-table modules.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

use sociate_shared::time;
use sociate_shared::MediaKind;

/// Ids bound per `IN (...)` query. Batch lookups split larger id lists so
/// a statement stays far below SQLite's host parameter limit.
pub(crate) const BATCH_SIZE: usize = 500;

/// `?1, ?2, ... ?n` for a dynamic `IN (...)` list, numbered from `start`.
pub(crate) fn placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    Ok(time::from_millis(ms))
}

pub(crate) fn media_kind(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<MediaKind>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| s.parse::<MediaKind>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// True for UNIQUE / PRIMARY KEY / CHECK violations.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
