use chrono::{DateTime, Utc};
use serde_json::json;

use lethe_core::config::{AlgorithmConfig, FeatureToggles};
use lethe_core::errors::LetheResult;
use lethe_core::memory::{LifecycleStatus, MemoryMeta, MetaPatch};

use crate::classifier::{self, StatusTransition};
use crate::formula::{self, ScoreBreakdown, ScoreInput};

/// Scores closer than this are treated as unchanged.
const SCORE_EPSILON: f64 = 1e-9;

/// Evaluation context shared by every record in a pass.
#[derive(Debug, Clone, Copy)]
pub struct DecayContext {
    /// Reference time. Fixed for a whole pass so results are deterministic.
    pub now: DateTime<Utc>,
}

impl Default for DecayContext {
    fn default() -> Self {
        Self { now: Utc::now() }
    }
}

/// Result of evaluating one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayOutcome {
    pub previous_score: f64,
    pub score: f64,
    pub previous_status: LifecycleStatus,
    pub status: LifecycleStatus,
    /// Present when the score formula ran.
    pub breakdown: Option<ScoreBreakdown>,
}

impl DecayOutcome {
    /// Whether anything needs writing back.
    pub fn changed(&self) -> bool {
        (self.score - self.previous_score).abs() > SCORE_EPSILON
            || self.status != self.previous_status
    }

    pub fn transition(&self) -> Option<StatusTransition> {
        classifier::transition(self.previous_status, self.status)
    }

    /// Meta patch carrying the new score and status.
    pub fn patch(&self) -> MetaPatch {
        let mut patch = MetaPatch::new();
        patch.insert("score".to_string(), json!(self.score));
        patch.insert("status".to_string(), json!(self.status));
        patch
    }
}

/// Recomputes score and lifecycle status for individual records.
///
/// Stateless: config and toggles are supplied per call so a pass can pin
/// one config snapshot for its whole duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecayEngine;

impl DecayEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one record. `base_score` is the stored score column.
    ///
    /// With the algorithm toggle off the score is carried over unchanged;
    /// with classification off the stored status is kept.
    pub fn evaluate(
        &self,
        meta: &MemoryMeta,
        base_score: f64,
        ctx: &DecayContext,
        config: &AlgorithmConfig,
        toggles: &FeatureToggles,
    ) -> LetheResult<DecayOutcome> {
        let (score, breakdown) = if toggles.algorithm {
            let input = ScoreInput {
                base_score,
                elapsed_ms: elapsed_ms(meta.last_accessed_at, ctx.now),
                access_count: meta.access_count,
                degree: meta.degree(),
                avg_link_weight: meta.avg_link_weight,
            };
            let breakdown = formula::calculate_breakdown(&input, config)?;
            (breakdown.final_score, Some(breakdown))
        } else {
            (base_score, None)
        };

        let status = if toggles.classification {
            classifier::classify(score, &config.thresholds)
        } else {
            meta.status
        };

        Ok(DecayOutcome {
            previous_score: base_score,
            score,
            previous_status: meta.status,
            status,
            breakdown,
        })
    }
}

/// Milliseconds since last access. Never-accessed records and timestamps in
/// the future count as zero elapsed time.
pub fn elapsed_ms(last_accessed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match last_accessed_at {
        Some(at) => (now - at).num_milliseconds().max(0) as f64,
        None => 0.0,
    }
}
