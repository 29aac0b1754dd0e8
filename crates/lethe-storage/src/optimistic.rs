//! Optimistic-lock read-modify-write.
//!
//! Read the current version, compare, then issue one conditional `UPDATE`
//! guarded by the expected version. Zero rows affected means another writer
//! got there first and is handled like a version mismatch.

use rusqlite::Connection;

use lethe_core::errors::{LetheError, LetheResult, StorageError};
use lethe_core::memory::MetaPatch;
use lethe_core::models::LockRetryConfig;

use crate::queries::memory_rows;

/// Shallow-merge `patch` onto the stored meta of `key` if its version is
/// still `expected_version`. Returns the new version, always
/// `expected + 1` for the attempt that succeeded.
///
/// Conflicts are retried up to `retry.max_conflict_retries` times. With
/// `resync_version` each retry adopts the observed version.
pub fn update_with_lock(
    conn: &Connection,
    key: &str,
    expected_version: u64,
    patch: &MetaPatch,
    score_override: Option<f64>,
    retry: &LockRetryConfig,
) -> LetheResult<u64> {
    let mut expected = expected_version;
    let mut attempt: u32 = 0;

    loop {
        let actual = match try_update(conn, key, expected, patch, score_override)? {
            Attempt::Written(version) => return Ok(version),
            Attempt::Conflict(actual) => actual,
        };

        if attempt >= retry.max_conflict_retries {
            tracing::debug!(
                key,
                expected_version = expected,
                actual_version = actual,
                attempts = attempt + 1,
                "optimistic lock conflict"
            );
            return Err(LetheError::OptimisticLockConflict {
                key: key.to_string(),
                expected_version: expected,
                actual_version: actual,
            });
        }

        attempt += 1;
        if retry.resync_version {
            expected = actual;
        }
        if retry.retry_delay_ms > 0 {
            std::thread::sleep(retry.retry_delay());
        }
    }
}

enum Attempt {
    Written(u64),
    Conflict(u64),
}

fn try_update(
    conn: &Connection,
    key: &str,
    expected: u64,
    patch: &MetaPatch,
    score_override: Option<f64>,
) -> LetheResult<Attempt> {
    let row = memory_rows::get_row(conn, key)?.ok_or_else(|| LetheError::MemoryNotFound {
        key: key.to_string(),
    })?;
    if row.meta.version != expected {
        return Ok(Attempt::Conflict(row.meta.version));
    }

    let next = expected
        .checked_add(1)
        .filter(|v| i64::try_from(*v).is_ok())
        .ok_or_else(|| StorageError::VersionOverflow {
            key: key.to_string(),
            version: expected,
        })?;
    let mut meta = row.meta.merged(patch)?;
    meta.version = next;

    match memory_rows::conditional_update(conn, key, &meta, score_override, expected)? {
        0 => {
            // Lost the race between read and write.
            let actual = memory_rows::get_row(conn, key)?
                .map(|r| r.meta.version)
                .ok_or_else(|| LetheError::MemoryNotFound {
                    key: key.to_string(),
                })?;
            Ok(Attempt::Conflict(actual))
        }
        _ => Ok(Attempt::Written(meta.version)),
    }
}
