//! The single write connection behind `tokio::sync::Mutex`.

use std::path::Path;

use rusqlite::Connection;
use tokio::sync::Mutex;

use lethe_core::errors::LetheResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// A write connection protected by an async mutex. Every storage write in
/// the process goes through one of these, giving single-writer semantics.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> LetheResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> LetheResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Exclusive access without locking, for setup before the connection
    /// is shared.
    pub fn get_mut(&mut self) -> &mut Connection {
        self.conn.get_mut()
    }

    /// Blocking access. Must not be called from inside an async task;
    /// use it from plain threads or `spawn_blocking`.
    pub fn with_conn_sync<F, T>(&self, f: F) -> LetheResult<T>
    where
        F: FnOnce(&Connection) -> LetheResult<T>,
    {
        let guard = self.conn.blocking_lock();
        f(&guard)
    }
}
