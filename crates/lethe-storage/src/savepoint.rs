//! Nestable transactions on a shared `&Connection`.
//!
//! `rusqlite::Savepoint` needs `&mut Connection`, which the batch processor
//! cannot hand out while per-row work also runs SQL on the same connection.
//! This guard issues the SAVEPOINT statements directly. An unfinished guard
//! rolls back on drop.

use rusqlite::Connection;

use lethe_core::errors::LetheResult;

use crate::to_storage_err;

pub struct Savepoint<'conn> {
    conn: &'conn Connection,
    name: &'static str,
    finished: bool,
}

impl<'conn> Savepoint<'conn> {
    /// Open a savepoint. Opens a transaction when none is active, otherwise
    /// nests inside the current one.
    pub fn begin(conn: &'conn Connection, name: &'static str) -> LetheResult<Self> {
        conn.execute_batch(&format!("SAVEPOINT {name}"))
            .map_err(|e| to_storage_err(format!("savepoint {name} begin: {e}")))?;
        Ok(Self {
            conn,
            name,
            finished: false,
        })
    }

    /// Release the savepoint. For the outermost savepoint this commits.
    /// A failed release leaves the savepoint open, so drop rolls it back.
    pub fn commit(mut self) -> LetheResult<()> {
        self.conn
            .execute_batch(&format!("RELEASE SAVEPOINT {}", self.name))
            .map_err(|e| to_storage_err(format!("savepoint {} commit: {e}", self.name)))?;
        self.finished = true;
        Ok(())
    }

    /// Undo everything since `begin` and close the savepoint.
    pub fn rollback(mut self) -> LetheResult<()> {
        self.finished = true;
        rollback_to(self.conn, self.name)
    }
}

impl Drop for Savepoint<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = rollback_to(self.conn, self.name) {
                tracing::warn!(savepoint = self.name, error = %e, "rollback on drop failed");
            }
        }
    }
}

fn rollback_to(conn: &Connection, name: &str) -> LetheResult<()> {
    conn.execute_batch(&format!(
        "ROLLBACK TRANSACTION TO SAVEPOINT {name}; RELEASE SAVEPOINT {name};"
    ))
    .map_err(|e| to_storage_err(format!("savepoint {name} rollback: {e}")))
}

/// Run `f` inside a savepoint, committing on `Ok` and rolling back on `Err`.
pub fn with_savepoint<T, F>(conn: &Connection, name: &'static str, f: F) -> LetheResult<T>
where
    F: FnOnce(&Connection) -> LetheResult<T>,
{
    let sp = Savepoint::begin(conn, name)?;
    match f(conn) {
        Ok(value) => {
            sp.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = sp.rollback() {
                tracing::warn!(savepoint = name, error = %rollback, "rollback after error failed");
            }
            Err(e)
        }
    }
}
