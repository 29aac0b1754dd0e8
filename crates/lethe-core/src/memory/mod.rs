pub mod meta;
pub mod row;
pub mod status;

pub use meta::{MemoryMeta, MetaPatch};
pub use row::MemoryRow;
pub use status::LifecycleStatus;
