//! Schema migrations tracked with `PRAGMA user_version`.

pub mod v001_initial_schema;
pub mod v002_checkpoints;

use rusqlite::Connection;

use lethe_core::errors::{LetheResult, StorageError};

use crate::to_storage_err;

type Migration = fn(&Connection) -> LetheResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_initial_schema::migrate),
    (2, v002_checkpoints::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 2;

/// Apply every migration newer than the database's current version.
pub fn run_migrations(conn: &Connection) -> LetheResult<()> {
    let current = current_version(conn)?;

    for (version, migrate) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        migrate(conn).map_err(|e| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .and_then(|_| conn.pragma_update(None, "user_version", version))
        .map_err(|e| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        tracing::info!(version = version, "applied migration");
    }

    Ok(())
}

pub fn current_version(conn: &Connection) -> LetheResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}
