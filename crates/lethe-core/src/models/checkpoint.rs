use serde::{Deserialize, Serialize};

/// Serializable progress marker for a batch run.
///
/// Reflects committed work only. Resupplying it to the batch processor
/// resumes at `next_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub next_offset: u64,
    pub processed_memories: u64,
    pub processed_batches: u64,
}
