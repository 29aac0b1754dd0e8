//! Checkpointed, retrying batch processor.

pub mod options;
pub mod processor;

pub use options::BatchOptions;
pub use processor::{process_in_batches, with_fn, FnProcessor, RowProcessor};
