//! Pages through `memories` in key order, one savepoint per page.
//!
//! A page commits as a unit or not at all. Failed pages are rolled back and
//! retried with exponential backoff; once retries run out the page is
//! recorded as failed and the cursor moves past it. The checkpoint only
//! ever reflects committed pages plus skipped ones.

use std::time::Instant;

use rusqlite::Connection;

use lethe_core::errors::{LetheError, LetheResult};
use lethe_core::memory::MemoryRow;
use lethe_core::models::{BatchStats, Checkpoint};
use lethe_core::traits::Cancellable;

use super::BatchOptions;
use crate::queries::memory_rows;
use crate::savepoint::Savepoint;

const PAGE_SAVEPOINT: &str = "lethe_batch_page";

/// Per-row work run inside a page transaction.
///
/// `process` may write through `conn`; its writes are rolled back with the
/// page if any later row in the page fails. Outcomes are handed to
/// `committed` only once their page has committed.
pub trait RowProcessor {
    type Outcome;

    fn process(&mut self, conn: &Connection, row: &MemoryRow) -> LetheResult<Self::Outcome>;

    fn committed(&mut self, _outcomes: Vec<Self::Outcome>) {}
}

/// Adapter running a plain closure as a [`RowProcessor`].
pub struct FnProcessor<F>(pub F);

impl<F> RowProcessor for FnProcessor<F>
where
    F: FnMut(&Connection, &MemoryRow) -> LetheResult<()>,
{
    type Outcome = ();

    fn process(&mut self, conn: &Connection, row: &MemoryRow) -> LetheResult<()> {
        (self.0)(conn, row)
    }
}

pub fn with_fn<F>(f: F) -> FnProcessor<F>
where
    F: FnMut(&Connection, &MemoryRow) -> LetheResult<()>,
{
    FnProcessor(f)
}

/// Run `processor` over every row, `options.batch_size` rows per
/// transaction, starting at `resume.next_offset`.
///
/// The row count is snapshotted once at the start. Row errors, timeouts and
/// storage errors are absorbed into the returned stats; only a failure to
/// take the initial count is returned as `Err`.
pub fn process_in_batches<P: RowProcessor>(
    conn: &Connection,
    options: &BatchOptions,
    resume: Option<Checkpoint>,
    interrupt: &dyn Cancellable,
    processor: &mut P,
) -> LetheResult<BatchStats> {
    let started = Instant::now();
    let total = memory_rows::count_rows(conn)?;
    let batch_size = options.batch_size.max(1);

    let mut stats = BatchStats {
        total_memories: total,
        checkpoint: resume.unwrap_or_default(),
        ..Default::default()
    };

    'pages: while stats.checkpoint.next_offset < total {
        if interrupt.is_cancelled() {
            stats.interrupted = true;
            break;
        }

        let offset = stats.checkpoint.next_offset;
        let mut retries: u32 = 0;

        loop {
            match run_page(conn, offset, batch_size, options, interrupt, processor) {
                Ok(PageOutcome::Committed { rows, outcomes }) => {
                    processor.committed(outcomes);
                    stats.processed_memories += rows;
                    stats.processed_batches += 1;
                    stats.checkpoint.next_offset = offset + rows;
                    stats.checkpoint.processed_memories += rows;
                    stats.checkpoint.processed_batches += 1;
                    break;
                }
                Ok(PageOutcome::Exhausted) => {
                    // Rows were removed since the count was taken.
                    stats.checkpoint.next_offset = total;
                    break 'pages;
                }
                Err(LetheError::Interrupted) => {
                    stats.interrupted = true;
                    break 'pages;
                }
                Err(e) => {
                    stats.last_error = Some(e.to_string());
                    if retries < options.max_retries {
                        retries += 1;
                        stats.retry_count += 1;
                        tracing::debug!(
                            offset,
                            retry = retries,
                            error = %e,
                            "batch page failed, retrying"
                        );
                        if !pause(options.backoff(retries), interrupt) {
                            stats.interrupted = true;
                            break 'pages;
                        }
                        continue;
                    }

                    let failure = LetheError::BatchFailed {
                        offset,
                        attempts: retries + 1,
                        reason: e.to_string(),
                    };
                    tracing::warn!(
                        event = "batch_failed",
                        offset,
                        attempts = retries + 1,
                        error = %e,
                        "{failure}"
                    );
                    stats.failed_batches += 1;
                    stats.last_error = Some(failure.to_string());
                    let skipped = (batch_size as u64).min(total - offset);
                    stats.checkpoint.next_offset = offset + skipped;
                    break;
                }
            }
        }

        if options.inter_batch_delay_ms > 0
            && stats.checkpoint.next_offset < total
            && !pause(
                std::time::Duration::from_millis(options.inter_batch_delay_ms),
                interrupt,
            )
        {
            stats.interrupted = true;
            break;
        }
    }

    stats.duration_ms = started.elapsed().as_millis() as u64;
    Ok(stats)
}

enum PageOutcome<T> {
    Committed { rows: u64, outcomes: Vec<T> },
    Exhausted,
}

fn run_page<P: RowProcessor>(
    conn: &Connection,
    offset: u64,
    batch_size: usize,
    options: &BatchOptions,
    interrupt: &dyn Cancellable,
    processor: &mut P,
) -> LetheResult<PageOutcome<P::Outcome>> {
    let started = Instant::now();
    let limit = options.transaction_timeout();
    let sp = Savepoint::begin(conn, PAGE_SAVEPOINT)?;

    let rows = memory_rows::select_page(conn, batch_size, offset)?;
    if rows.is_empty() {
        sp.commit()?;
        return Ok(PageOutcome::Exhausted);
    }

    let check_deadline = || -> LetheResult<()> {
        let elapsed = started.elapsed();
        if elapsed >= limit {
            return Err(LetheError::TransactionTimeout {
                elapsed_ms: elapsed.as_millis() as u64,
                limit_ms: options.transaction_timeout_ms,
            });
        }
        Ok(())
    };

    let mut outcomes = Vec::with_capacity(rows.len());
    for row in &rows {
        if interrupt.is_cancelled() {
            return Err(LetheError::Interrupted);
        }
        check_deadline()?;
        outcomes.push(processor.process(conn, row)?);
    }
    check_deadline()?;

    sp.commit()?;
    Ok(PageOutcome::Committed {
        rows: rows.len() as u64,
        outcomes,
    })
}

/// Sleep in short slices so an interrupt is noticed promptly. Returns false
/// when interrupted.
fn pause(duration: std::time::Duration, interrupt: &dyn Cancellable) -> bool {
    const SLICE: std::time::Duration = std::time::Duration::from_millis(10);
    let deadline = Instant::now() + duration;
    loop {
        if interrupt.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(SLICE.min(deadline - now));
    }
}
