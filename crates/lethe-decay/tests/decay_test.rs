use chrono::{Duration, Utc};
use lethe_core::config::{AlgorithmConfig, FeatureToggles, Thresholds};
use lethe_core::memory::{LifecycleStatus, MemoryMeta};
use lethe_core::LetheError;
use lethe_decay::{
    calculate_breakdown, calculate_memory_score, classify, DecayContext, DecayEngine, ScoreInput,
};

const DAY_MS: f64 = 24.0 * 3_600_000.0;

fn input(base_score: f64, days: f64) -> ScoreInput {
    ScoreInput {
        base_score,
        elapsed_ms: days * DAY_MS,
        access_count: 0,
        degree: 0,
        avg_link_weight: None,
    }
}

fn meta_accessed(days_ago: i64, access_count: u64, degree: u64) -> MemoryMeta {
    MemoryMeta {
        score: 70.0,
        access_count,
        in_degree: degree,
        out_degree: 0,
        last_accessed_at: Some(Utc::now() - Duration::days(days_ago)),
        ..Default::default()
    }
}

// ── Score formula ─────────────────────────────────────────────────────────

#[test]
fn year_old_active_record_drops_below_active_threshold() {
    let config = AlgorithmConfig::default();
    let score = calculate_memory_score(&input(70.0, 365.0), &config).unwrap();
    assert!(score < 70.0, "score was {score}");
    assert!(score >= 66.5 - 1e-6);
    assert_eq!(classify(score, &config.thresholds), LifecycleStatus::Cold);
}

#[test]
fn fresh_record_is_not_decayed() {
    let b = calculate_breakdown(&input(55.0, 0.0), &AlgorithmConfig::default()).unwrap();
    assert_eq!(b.time_decay, 1.0);
    assert_eq!(b.final_score, 55.0);
}

#[test]
fn usage_boost_bounded_by_ten() {
    let mut i = input(0.0, 0.0);
    i.access_count = 1_000_000;
    let b = calculate_breakdown(&i, &AlgorithmConfig::default()).unwrap();
    assert!(b.usage_boost <= 10.0);
    assert!(b.usage_boost > 9.0);
}

#[test]
fn structure_boost_bounded_by_five() {
    let mut i = input(0.0, 0.0);
    i.degree = 10_000;
    let b = calculate_breakdown(&i, &AlgorithmConfig::default()).unwrap();
    assert!(b.structure_boost <= 5.0);
    assert!(b.structure_boost > 0.0);
}

#[test]
fn weak_links_give_smaller_boost() {
    let config = AlgorithmConfig::default();
    let mut strong = input(0.0, 0.0);
    strong.degree = 10;
    let mut weak = strong;
    weak.avg_link_weight = Some(0.2);
    let s = calculate_memory_score(&strong, &config).unwrap();
    let w = calculate_memory_score(&weak, &config).unwrap();
    assert!(w < s);
}

#[test]
fn score_clamped_to_configured_range() {
    let mut config = AlgorithmConfig::default();
    config.min_score = 10.0;
    config.max_score = 60.0;
    assert_eq!(calculate_memory_score(&input(0.0, 0.0), &config).unwrap(), 10.0);
    assert_eq!(calculate_memory_score(&input(95.0, 0.0), &config).unwrap(), 60.0);
}

#[test]
fn non_finite_inputs_rejected() {
    let config = AlgorithmConfig::default();
    assert!(calculate_memory_score(&input(f64::INFINITY, 0.0), &config).is_err());
    let mut i = input(50.0, 0.0);
    i.elapsed_ms = f64::NAN;
    assert!(calculate_memory_score(&i, &config).is_err());
    let mut i = input(50.0, 0.0);
    i.elapsed_ms = -1.0;
    assert!(calculate_memory_score(&i, &config).is_err());
}

// ── Classifier ────────────────────────────────────────────────────────────

#[test]
fn classifier_threshold_edges() {
    let t = Thresholds::default();
    assert_eq!(classify(100.0, &t), LifecycleStatus::Active);
    assert_eq!(classify(70.0, &t), LifecycleStatus::Active);
    assert_eq!(classify(69.0, &t), LifecycleStatus::Cold);
    assert_eq!(classify(30.0, &t), LifecycleStatus::Cold);
    assert_eq!(classify(29.0, &t), LifecycleStatus::Deprecated);
    assert_eq!(classify(0.0, &t), LifecycleStatus::Deprecated);
}

// ── Engine ────────────────────────────────────────────────────────────────

#[test]
fn engine_moves_stale_record_to_cold() {
    let engine = DecayEngine::new();
    let meta = meta_accessed(365, 0, 0);
    let outcome = engine
        .evaluate(
            &meta,
            70.0,
            &DecayContext::default(),
            &AlgorithmConfig::default(),
            &FeatureToggles::default(),
        )
        .unwrap();
    assert!(outcome.score < 70.0);
    assert_eq!(outcome.status, LifecycleStatus::Cold);
    assert!(outcome.changed());
    let t = outcome.transition().unwrap();
    assert_eq!(t.from, LifecycleStatus::Active);
    assert_eq!(t.to, LifecycleStatus::Cold);

    let patch = outcome.patch();
    assert_eq!(patch["status"], "cold");
    assert!(patch["score"].as_f64().unwrap() < 70.0);
}

#[test]
fn engine_recent_heavy_use_stays_active() {
    let engine = DecayEngine::new();
    let meta = meta_accessed(0, 40, 12);
    let outcome = engine
        .evaluate(
            &meta,
            65.0,
            &DecayContext::default(),
            &AlgorithmConfig::default(),
            &FeatureToggles::default(),
        )
        .unwrap();
    assert!(outcome.score > 70.0);
    assert_eq!(outcome.status, LifecycleStatus::Active);
}

#[test]
fn engine_propagates_input_validation() {
    let engine = DecayEngine::new();
    let err = engine
        .evaluate(
            &MemoryMeta::default(),
            f64::NAN,
            &DecayContext::default(),
            &AlgorithmConfig::default(),
            &FeatureToggles::default(),
        )
        .unwrap_err();
    assert!(matches!(err, LetheError::InputValidation(_)));
    assert!(!err.is_retryable());
}

#[test]
fn engine_is_deterministic_for_fixed_now() {
    let engine = DecayEngine::new();
    let ctx = DecayContext { now: Utc::now() };
    let meta = meta_accessed(30, 5, 3);
    let config = AlgorithmConfig::default();
    let toggles = FeatureToggles::default();
    let a = engine.evaluate(&meta, 50.0, &ctx, &config, &toggles).unwrap();
    let b = engine.evaluate(&meta, 50.0, &ctx, &config, &toggles).unwrap();
    assert_eq!(a, b);
}
