//! Size-rotated append-only file output.

mod rotating;

pub use rotating::RotatingFileWriter;
