//! Individual score components. Each validates its own inputs.

pub mod structure;
pub mod temporal;
pub mod usage;

/// Milliseconds per hour, for converting hour-denominated config.
pub(crate) const MS_PER_HOUR: f64 = 3_600_000.0;

/// Clamp without panicking when bounds come from an unvalidated config.
pub(crate) fn bound(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}
