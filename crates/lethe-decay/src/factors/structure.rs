use lethe_core::config::defaults::{STRUCTURE_BOOST_CAP, STRUCTURE_HALF_SATURATION_DEGREE};
use lethe_core::config::StructureBoostConfig;
use lethe_core::errors::InputValidationError;

use super::bound;

/// Structural connectivity boost.
///
/// Formula: `d / (d + 5) × avgLinkWeight × maxBoost`, where `d` is the
/// in+out degree capped at the saturation count and the link weight is held
/// inside `[min_link_weight, max_link_weight]`. A missing weight counts as
/// `max_link_weight`. Range: 0.0 – 5.0.
pub fn calculate(
    degree: u64,
    avg_link_weight: Option<f64>,
    config: &StructureBoostConfig,
) -> Result<f64, InputValidationError> {
    let max_boost =
        InputValidationError::check_non_negative("structure_boost.max_boost", config.max_boost)?;
    let min_weight = InputValidationError::check_non_negative(
        "structure_boost.min_link_weight",
        config.min_link_weight,
    )?;
    let max_weight = InputValidationError::check_non_negative(
        "structure_boost.max_link_weight",
        config.max_link_weight,
    )?;
    let weight = match avg_link_weight {
        Some(w) => InputValidationError::check_non_negative("avg_link_weight", w)?,
        None => max_weight,
    };

    if degree == 0 {
        return Ok(0.0);
    }

    let d = degree.min(config.saturation_link_count) as f64;
    let saturation = d / (d + STRUCTURE_HALF_SATURATION_DEGREE);
    let weight = bound(weight, min_weight, max_weight);

    Ok(bound(saturation * weight * max_boost, 0.0, STRUCTURE_BOOST_CAP))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_degree_zero_boost() {
        assert_eq!(calculate(0, None, &StructureBoostConfig::default()).unwrap(), 0.0);
    }

    #[test]
    fn half_saturation_at_five_links() {
        let boost = calculate(5, Some(1.0), &StructureBoostConfig::default()).unwrap();
        assert!((boost - 2.5).abs() < 1e-9);
    }

    #[test]
    fn weight_is_clamped_into_configured_range() {
        let config = StructureBoostConfig::default();
        let low = calculate(10, Some(0.0), &config).unwrap();
        let floor = calculate(10, Some(config.min_link_weight), &config).unwrap();
        assert_eq!(low, floor);
    }

    #[test]
    fn negative_weight_rejected() {
        assert!(calculate(3, Some(-0.5), &StructureBoostConfig::default()).is_err());
    }
}
