pub mod checkpoint_ops;
pub mod memory_rows;
