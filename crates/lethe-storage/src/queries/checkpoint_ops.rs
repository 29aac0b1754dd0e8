//! Persisted checkpoints, so an interrupted pass resumes after a restart.

use rusqlite::{params, Connection, OptionalExtension};

use lethe_core::errors::LetheResult;
use lethe_core::models::Checkpoint;

use crate::to_storage_err;

pub fn save_checkpoint(conn: &Connection, pass_name: &str, cp: &Checkpoint) -> LetheResult<()> {
    conn.execute(
        "INSERT INTO batch_checkpoints (pass_name, next_offset, processed_memories, processed_batches)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(pass_name) DO UPDATE SET
            next_offset = excluded.next_offset,
            processed_memories = excluded.processed_memories,
            processed_batches = excluded.processed_batches,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        params![
            pass_name,
            cp.next_offset as i64,
            cp.processed_memories as i64,
            cp.processed_batches as i64
        ],
    )
    .map_err(|e| to_storage_err(format!("save_checkpoint {pass_name}: {e}")))?;
    Ok(())
}

pub fn load_checkpoint(conn: &Connection, pass_name: &str) -> LetheResult<Option<Checkpoint>> {
    conn.query_row(
        "SELECT next_offset, processed_memories, processed_batches
         FROM batch_checkpoints WHERE pass_name = ?1",
        params![pass_name],
        |row| {
            Ok(Checkpoint {
                next_offset: row.get::<_, i64>(0)?.max(0) as u64,
                processed_memories: row.get::<_, i64>(1)?.max(0) as u64,
                processed_batches: row.get::<_, i64>(2)?.max(0) as u64,
            })
        },
    )
    .optional()
    .map_err(|e| to_storage_err(format!("load_checkpoint {pass_name}: {e}")))
}

pub fn clear_checkpoint(conn: &Connection, pass_name: &str) -> LetheResult<()> {
    conn.execute(
        "DELETE FROM batch_checkpoints WHERE pass_name = ?1",
        params![pass_name],
    )
    .map_err(|e| to_storage_err(format!("clear_checkpoint {pass_name}: {e}")))?;
    Ok(())
}
