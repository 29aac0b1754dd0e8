//! Row-level queries against the `memories` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use lethe_core::errors::{LetheResult, StorageError};
use lethe_core::memory::{MemoryMeta, MemoryRow};

use crate::to_storage_err;

const ROW_COLUMNS: &str = "key, summary, text, meta, score";

pub fn count_rows(conn: &Connection) -> LetheResult<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
        .map_err(|e| to_storage_err(format!("count_rows: {e}")))?;
    Ok(count.max(0) as u64)
}

/// One page of rows in stable key order.
pub fn select_page(conn: &Connection, limit: usize, offset: u64) -> LetheResult<Vec<MemoryRow>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ROW_COLUMNS} FROM memories ORDER BY key ASC LIMIT ?1 OFFSET ?2"
        ))
        .map_err(|e| to_storage_err(format!("select_page prepare: {e}")))?;

    let raw = stmt
        .query_map(params![limit as i64, offset as i64], raw_row)
        .map_err(|e| to_storage_err(format!("select_page: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(format!("select_page row: {e}")))?;

    raw.into_iter().map(RawRow::into_row).collect()
}

pub fn get_row(conn: &Connection, key: &str) -> LetheResult<Option<MemoryRow>> {
    let raw = conn
        .query_row(
            &format!("SELECT {ROW_COLUMNS} FROM memories WHERE key = ?1"),
            params![key],
            raw_row,
        )
        .optional()
        .map_err(|e| to_storage_err(format!("get_row {key}: {e}")))?;
    raw.map(RawRow::into_row).transpose()
}

/// Insert or replace a row. Used by ingestion collaborators and tests.
pub fn upsert_row(conn: &Connection, row: &MemoryRow) -> LetheResult<()> {
    let meta = row.meta.to_json()?;
    conn.execute(
        "INSERT INTO memories (key, summary, text, meta, score) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(key) DO UPDATE SET
            summary = excluded.summary,
            text = excluded.text,
            meta = excluded.meta,
            score = excluded.score,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        params![row.key, row.summary, row.text, meta, row.score],
    )
    .map_err(|e| to_storage_err(format!("upsert_row {}: {e}", row.key)))?;
    Ok(())
}

/// Write `new_meta` only when the stored meta version equals
/// `expected_version`. The check and the write are one statement.
/// `new_score = None` leaves the score column untouched.
pub fn conditional_update(
    conn: &Connection,
    key: &str,
    new_meta: &MemoryMeta,
    new_score: Option<f64>,
    expected_version: u64,
) -> LetheResult<usize> {
    let expected = i64::try_from(expected_version).map_err(|_| StorageError::VersionOverflow {
        key: key.to_string(),
        version: expected_version,
    })?;
    let meta = new_meta.to_json()?;
    conn.execute(
        "UPDATE memories
         SET meta = ?1,
             score = COALESCE(?2, score),
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
         WHERE key = ?3
           AND COALESCE(json_extract(meta, '$.version'), 0) = ?4",
        params![meta, new_score, key, expected],
    )
    .map_err(|e| to_storage_err(format!("conditional_update {key}: {e}")))
}

struct RawRow {
    key: String,
    summary: String,
    text: String,
    meta: String,
    score: f64,
}

impl RawRow {
    fn into_row(self) -> LetheResult<MemoryRow> {
        let meta: MemoryMeta =
            serde_json::from_str(&self.meta).map_err(|e| StorageError::CorruptMeta {
                key: self.key.clone(),
                reason: e.to_string(),
            })?;
        Ok(MemoryRow {
            key: self.key,
            summary: self.summary,
            text: self.text,
            meta,
            score: self.score,
        })
    }
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        key: row.get(0)?,
        summary: row.get(1)?,
        text: row.get(2)?,
        meta: row.get(3)?,
        score: row.get(4)?,
    })
}
