//! v002: persisted batch checkpoints, one row per pass name.

use rusqlite::Connection;

use lethe_core::errors::LetheResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LetheResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS batch_checkpoints (
            pass_name           TEXT PRIMARY KEY,
            next_offset         INTEGER NOT NULL,
            processed_memories  INTEGER NOT NULL,
            processed_batches   INTEGER NOT NULL,
            updated_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
