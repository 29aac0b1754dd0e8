//! v001: memories and schema_version.
//!
//! `meta` holds the JSON meta object; `score` mirrors the score the decay
//! formula reads as its base.

use rusqlite::Connection;

use lethe_core::errors::LetheResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LetheResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS memories (
            key         TEXT PRIMARY KEY,
            summary     TEXT NOT NULL DEFAULT '',
            text        TEXT NOT NULL DEFAULT '',
            meta        TEXT NOT NULL DEFAULT '{}',
            score       REAL NOT NULL DEFAULT 0,
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_memories_score ON memories(score);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
