use lethe_core::config::AlgorithmConfig;
use lethe_core::errors::InputValidationError;
use serde::{Deserialize, Serialize};

use crate::factors::{self, bound};

/// Raw inputs for one score computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput {
    pub base_score: f64,
    pub elapsed_ms: f64,
    pub access_count: u64,
    pub degree: u64,
    pub avg_link_weight: Option<f64>,
}

/// Additive vitality formula.
///
/// ```text
/// score = clamp(baseScore × timeDecay + usageBoost + structureBoost,
///               minScore, maxScore)
/// ```
pub fn calculate_memory_score(
    input: &ScoreInput,
    config: &AlgorithmConfig,
) -> Result<f64, InputValidationError> {
    Ok(calculate_breakdown(input, config)?.final_score)
}

/// Each factor individually, for debugging/observability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub time_decay: f64,
    pub usage_boost: f64,
    pub structure_boost: f64,
    pub final_score: f64,
}

/// Compute the score with a full breakdown of each factor.
pub fn calculate_breakdown(
    input: &ScoreInput,
    config: &AlgorithmConfig,
) -> Result<ScoreBreakdown, InputValidationError> {
    let base = InputValidationError::check_non_negative("base_score", input.base_score)?;
    let min_score = InputValidationError::check_finite("min_score", config.min_score)?;
    let max_score = InputValidationError::check_finite("max_score", config.max_score)?;

    let time_decay = factors::temporal::calculate(input.elapsed_ms, &config.time_decay)?;
    let usage_boost =
        factors::usage::calculate(input.access_count, input.elapsed_ms, &config.usage_boost)?;
    let structure_boost = factors::structure::calculate(
        input.degree,
        input.avg_link_weight,
        &config.structure_boost,
    )?;

    let raw = base * time_decay + usage_boost + structure_boost;

    Ok(ScoreBreakdown {
        base_score: base,
        time_decay,
        usage_boost,
        structure_boost,
        final_score: bound(raw, min_score, max_score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(base: f64) -> ScoreInput {
        ScoreInput {
            base_score: base,
            elapsed_ms: 0.0,
            access_count: 0,
            degree: 0,
            avg_link_weight: None,
        }
    }

    #[test]
    fn untouched_record_keeps_its_score() {
        let score = calculate_memory_score(&input(42.0), &AlgorithmConfig::default()).unwrap();
        assert_eq!(score, 42.0);
    }

    #[test]
    fn boosts_are_additive_and_clamped() {
        let mut i = input(99.0);
        i.access_count = 50;
        i.degree = 20;
        let score = calculate_memory_score(&i, &AlgorithmConfig::default()).unwrap();
        assert_eq!(score, 100.0);
    }

    #[test]
    fn breakdown_matches_components() {
        let mut i = input(50.0);
        i.access_count = 3;
        i.degree = 5;
        let b = calculate_breakdown(&i, &AlgorithmConfig::default()).unwrap();
        let expected = b.base_score * b.time_decay + b.usage_boost + b.structure_boost;
        assert!((b.final_score - expected).abs() < 1e-9);
    }

    #[test]
    fn nan_base_score_rejected() {
        assert!(calculate_memory_score(&input(f64::NAN), &AlgorithmConfig::default()).is_err());
    }
}
