use lethe_core::config::{AlgorithmConfig, Thresholds};
use lethe_core::memory::LifecycleStatus;
use lethe_decay::factors::temporal;
use lethe_decay::{calculate_breakdown, calculate_memory_score, classify, ScoreInput};
use proptest::prelude::*;

fn arb_input() -> impl Strategy<Value = ScoreInput> {
    (
        0.0f64..200.0,
        0.0f64..1e12,
        0u64..10_000,
        0u64..10_000,
        proptest::option::of(0.0f64..2.0),
    )
        .prop_map(|(base_score, elapsed_ms, access_count, degree, avg_link_weight)| ScoreInput {
            base_score,
            elapsed_ms,
            access_count,
            degree,
            avg_link_weight,
        })
}

// ── Score always within configured bounds ─────────────────────────────────

proptest! {
    #[test]
    fn score_within_bounds(input in arb_input()) {
        let config = AlgorithmConfig::default();
        let score = calculate_memory_score(&input, &config).unwrap();
        prop_assert!(score >= config.min_score);
        prop_assert!(score <= config.max_score);
    }
}

// ── Factors stay in their ranges ──────────────────────────────────────────

proptest! {
    #[test]
    fn factor_ranges(input in arb_input()) {
        let b = calculate_breakdown(&input, &AlgorithmConfig::default()).unwrap();
        prop_assert!(b.time_decay >= 0.95 && b.time_decay <= 1.0);
        prop_assert!(b.usage_boost >= 0.0 && b.usage_boost <= 10.0);
        prop_assert!(b.structure_boost >= 0.0 && b.structure_boost <= 5.0);
    }
}

// ── Time decay is non-increasing ──────────────────────────────────────────

proptest! {
    #[test]
    fn time_decay_non_increasing(a in 0.0f64..1e12, b in 0.0f64..1e12) {
        let config = AlgorithmConfig::default().time_decay;
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let f_early = temporal::calculate(early, &config).unwrap();
        let f_late = temporal::calculate(late, &config).unwrap();
        prop_assert!(f_late <= f_early + 1e-12);
    }
}

// ── More accesses never lower the score ───────────────────────────────────

proptest! {
    #[test]
    fn access_count_monotone(input in arb_input(), extra in 0u64..100) {
        let config = AlgorithmConfig::default();
        let mut more = input;
        more.access_count = input.access_count + extra;
        let base = calculate_memory_score(&input, &config).unwrap();
        let boosted = calculate_memory_score(&more, &config).unwrap();
        prop_assert!(boosted + 1e-9 >= base);
    }
}

// ── Classification agrees with thresholds ─────────────────────────────────

proptest! {
    #[test]
    fn classification_consistent(score in 0.0f64..100.0, cold in 0.0f64..50.0, gap in 0.0f64..50.0) {
        let t = Thresholds { active_min_score: cold + gap, cold_min_score: cold };
        let status = classify(score, &t);
        match status {
            LifecycleStatus::Active => prop_assert!(score >= t.active_min_score),
            LifecycleStatus::Cold => {
                prop_assert!(score < t.active_min_score);
                prop_assert!(score >= t.cold_min_score);
            }
            LifecycleStatus::Deprecated => prop_assert!(score < t.cold_min_score),
        }
    }
}
