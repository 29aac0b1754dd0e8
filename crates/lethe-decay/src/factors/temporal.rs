use lethe_core::config::defaults::{TIME_DECAY_FLOOR_MAX, TIME_DECAY_FLOOR_MIN};
use lethe_core::config::TimeDecayConfig;
use lethe_core::errors::InputValidationError;

use super::{bound, MS_PER_HOUR};

/// Time decay factor: `1 - (1 - floor) * (1 - e^(-elapsed / tau))`.
///
/// Range: `floor` – 1.0, where `floor` is `min_factor` constrained to
/// [0.95, 1.0]. Zero elapsed time yields exactly 1.0. Non-increasing in
/// `elapsed_ms`. `max_factor` is validated with the config but does not cap
/// the result.
pub fn calculate(elapsed_ms: f64, config: &TimeDecayConfig) -> Result<f64, InputValidationError> {
    let elapsed_ms = InputValidationError::check_non_negative("elapsed_ms", elapsed_ms)?;
    InputValidationError::check_finite("time_decay.min_factor", config.min_factor)?;
    InputValidationError::check_finite("time_decay.max_factor", config.max_factor)?;
    let hours = InputValidationError::check_non_negative(
        "time_decay.full_decay_hours",
        config.full_decay_hours,
    )?;

    let floor = bound(config.min_factor, TIME_DECAY_FLOOR_MIN, TIME_DECAY_FLOOR_MAX);
    let tau_ms = (hours * MS_PER_HOUR).max(1.0);

    let raw = 1.0 - (1.0 - floor) * (1.0 - (-elapsed_ms / tau_ms).exp());
    Ok(bound(raw, floor, 1.0))
}
