/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("corrupt meta for memory {key}: {reason}")]
    CorruptMeta { key: String, reason: String },

    /// Versions are stored as SQLite integers, so they top out at `i64::MAX`.
    #[error("version {version} of memory {key} cannot be incremented")]
    VersionOverflow { key: String, version: u64 },
}
