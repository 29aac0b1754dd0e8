//! StorageEngine: owns the write connection, runs migrations on open, and
//! implements [`MemoryStore`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use lethe_core::errors::LetheResult;
use lethe_core::memory::{MemoryMeta, MemoryRow, MetaPatch};
use lethe_core::models::{BatchStats, Checkpoint, LockRetryConfig};
use lethe_core::traits::{Cancellable, MemoryStore};

use crate::batch::{self, BatchOptions, RowProcessor};
use crate::migrations;
use crate::optimistic;
use crate::pool::WriteConnection;
use crate::queries::{checkpoint_ops, memory_rows};

/// The storage handle. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct StorageEngine {
    writer: Arc<WriteConnection>,
    db_path: Option<PathBuf>,
}

impl StorageEngine {
    /// Open (or create) a database file.
    /// Migrations run before the connection is shared, so opening is safe
    /// from async code.
    pub fn open(path: &Path) -> LetheResult<Self> {
        Ok(Self {
            writer: Arc::new(Self::initialize(WriteConnection::open(path)?)?),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> LetheResult<Self> {
        Ok(Self {
            writer: Arc::new(Self::initialize(WriteConnection::open_in_memory()?)?),
            db_path: None,
        })
    }

    fn initialize(mut writer: WriteConnection) -> LetheResult<WriteConnection> {
        migrations::run_migrations(writer.get_mut())?;
        Ok(writer)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Blocking access to the connection. Not for use inside async tasks.
    pub fn with_conn<F, T>(&self, f: F) -> LetheResult<T>
    where
        F: FnOnce(&Connection) -> LetheResult<T>,
    {
        self.writer.with_conn_sync(f)
    }

    pub fn upsert_row(&self, row: &MemoryRow) -> LetheResult<()> {
        self.with_conn(|conn| memory_rows::upsert_row(conn, row))
    }

    /// Insert many rows in one transaction.
    pub fn upsert_rows(&self, rows: &[MemoryRow]) -> LetheResult<usize> {
        self.with_conn(|conn| {
            crate::savepoint::with_savepoint(conn, "lethe_bulk_upsert", |conn| {
                for row in rows {
                    memory_rows::upsert_row(conn, row)?;
                }
                Ok(rows.len())
            })
        })
    }

    /// Run the batch processor while holding the write connection for the
    /// whole run.
    pub fn process_in_batches<P: RowProcessor>(
        &self,
        options: &BatchOptions,
        resume: Option<Checkpoint>,
        interrupt: &dyn Cancellable,
        processor: &mut P,
    ) -> LetheResult<BatchStats> {
        self.with_conn(|conn| batch::process_in_batches(conn, options, resume, interrupt, processor))
    }

    pub fn load_checkpoint(&self, pass_name: &str) -> LetheResult<Option<Checkpoint>> {
        self.with_conn(|conn| checkpoint_ops::load_checkpoint(conn, pass_name))
    }

    pub fn save_checkpoint(&self, pass_name: &str, cp: &Checkpoint) -> LetheResult<()> {
        self.with_conn(|conn| checkpoint_ops::save_checkpoint(conn, pass_name, cp))
    }

    pub fn clear_checkpoint(&self, pass_name: &str) -> LetheResult<()> {
        self.with_conn(|conn| checkpoint_ops::clear_checkpoint(conn, pass_name))
    }

    pub fn schema_version(&self) -> LetheResult<u32> {
        self.with_conn(migrations::current_version)
    }
}

impl MemoryStore for StorageEngine {
    fn count_rows(&self) -> LetheResult<u64> {
        self.with_conn(memory_rows::count_rows)
    }

    fn select_page(&self, limit: usize, offset: u64) -> LetheResult<Vec<MemoryRow>> {
        self.with_conn(|conn| memory_rows::select_page(conn, limit, offset))
    }

    fn get_row(&self, key: &str) -> LetheResult<Option<MemoryRow>> {
        self.with_conn(|conn| memory_rows::get_row(conn, key))
    }

    fn conditional_update(
        &self,
        key: &str,
        new_meta: &MemoryMeta,
        new_score: Option<f64>,
        expected_version: u64,
    ) -> LetheResult<usize> {
        self.with_conn(|conn| {
            memory_rows::conditional_update(conn, key, new_meta, new_score, expected_version)
        })
    }

    fn update_with_lock(
        &self,
        key: &str,
        expected_version: u64,
        patch: &MetaPatch,
        score_override: Option<f64>,
        retry: &LockRetryConfig,
    ) -> LetheResult<u64> {
        self.with_conn(|conn| {
            optimistic::update_with_lock(conn, key, expected_version, patch, score_override, retry)
        })
    }
}
