use lethe_core::config::defaults::USAGE_BOOST_CAP;
use lethe_core::config::UsageBoostConfig;
use lethe_core::errors::InputValidationError;

use super::{bound, MS_PER_HOUR};

/// Usage frequency boost with diminishing returns.
///
/// Formula: `u = a / (1 + elapsed / window)`, `boost = u / (u + 1) × maxBoost`
/// where `a` is the access count capped at the saturation count.
/// Range: 0.0 – 10.0. Zero accesses give zero boost.
pub fn calculate(
    access_count: u64,
    elapsed_ms: f64,
    config: &UsageBoostConfig,
) -> Result<f64, InputValidationError> {
    let elapsed_ms = InputValidationError::check_non_negative("elapsed_ms", elapsed_ms)?;
    let max_boost =
        InputValidationError::check_non_negative("usage_boost.max_boost", config.max_boost)?;
    let window_hours =
        InputValidationError::check_non_negative("usage_boost.window_hours", config.window_hours)?;

    if access_count == 0 {
        return Ok(0.0);
    }

    let accesses = access_count.min(config.saturation_access_count) as f64;
    let window_ms = (window_hours * MS_PER_HOUR).max(1.0);
    let discounted = accesses / (1.0 + elapsed_ms / window_ms);
    let boost = discounted / (discounted + 1.0) * max_boost;

    Ok(bound(boost, 0.0, USAGE_BOOST_CAP))
}
