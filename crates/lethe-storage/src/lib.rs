//! # lethe-storage
//!
//! SQLite-backed [`MemoryStore`](lethe_core::MemoryStore): a single owned
//! write connection, schema migrations, atomic conditional updates, the
//! optimistic lock updater, nested savepoints, and the checkpointed batch
//! processor that drives decay passes.

pub mod batch;
pub mod engine;
pub mod migrations;
pub mod optimistic;
pub mod pool;
pub mod queries;
pub mod savepoint;

pub use batch::{process_in_batches, with_fn, BatchOptions, FnProcessor, RowProcessor};
pub use engine::StorageEngine;
pub use savepoint::Savepoint;

use lethe_core::errors::{LetheError, StorageError};

/// Helper to convert a SQLite failure message into a `LetheError`.
pub fn to_storage_err(msg: impl Into<String>) -> LetheError {
    LetheError::StorageError(StorageError::SqliteError {
        message: msg.into(),
    })
}
