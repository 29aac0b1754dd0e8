use lethe_core::config::*;
use lethe_core::errors::ConfigError;
use serde_json::json;

#[test]
fn config_loads_from_empty_object_with_all_defaults() {
    let config = EngineConfig::from_json_str("{}").unwrap();
    let algo = &config.algorithm_config;

    assert_eq!(algo.min_score, 0.0);
    assert_eq!(algo.max_score, 100.0);
    assert_eq!(algo.thresholds.active_min_score, 70.0);
    assert_eq!(algo.thresholds.cold_min_score, 30.0);
    assert_eq!(algo.time_decay.min_factor, 0.95);
    assert_eq!(algo.time_decay.max_factor, 1.0);
    assert_eq!(algo.scheduler.interval_ms, 3_600_000);
    assert_eq!(algo.scheduler.batch_size, 500);
    assert_eq!(algo.batch.max_retries, 3);

    assert!(config.feature_toggles.algorithm);
    assert!(config.feature_toggles.scheduler);
    assert!(config.feature_toggles.classification);
    assert!(config.feature_toggles.alerting);
    assert!(config.feature_toggles.logging);
}

#[test]
fn flat_source_is_read_as_algorithm_config() {
    let config = EngineConfig::from_value(json!({
        "minScore": 5,
        "thresholds": { "activeMinScore": 80, "coldMinScore": 40 },
        "scheduler": { "intervalMs": 1000, "batchSize": 25 }
    }))
    .unwrap();
    let algo = &config.algorithm_config;
    assert_eq!(algo.min_score, 5.0);
    assert_eq!(algo.thresholds.active_min_score, 80.0);
    assert_eq!(algo.thresholds.cold_min_score, 40.0);
    assert_eq!(algo.scheduler.interval_ms, 1000);
    assert_eq!(algo.scheduler.batch_size, 25);
    // Untouched sections keep defaults.
    assert_eq!(algo.usage_boost.max_boost, 10.0);
    assert_eq!(config.feature_toggles, FeatureToggles::default());
}

#[test]
fn enveloped_source_reads_both_sections() {
    let config = EngineConfig::from_value(json!({
        "algorithmConfig": { "maxScore": 90 },
        "featureToggles": { "alerting": false }
    }))
    .unwrap();
    assert_eq!(config.algorithm_config.max_score, 90.0);
    assert!(!config.feature_toggles.alerting);
    assert!(config.feature_toggles.logging);
}

#[test]
fn unknown_fields_are_ignored() {
    let config = EngineConfig::from_value(json!({ "retentionDays": 30, "maxScore": 100 })).unwrap();
    assert_eq!(config.algorithm_config.max_score, 100.0);
}

#[test]
fn invalid_thresholds_rejected_at_parse() {
    let err = EngineConfig::from_value(json!({
        "thresholds": { "activeMinScore": 20, "coldMinScore": 50 }
    }))
    .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let err = EngineConfig::from_value(json!({ "scheduler": { "batchSize": "lots" } })).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn toml_source_parses() {
    let toml = r#"
[algorithm_config]
max_score = 95

[algorithm_config.time_decay]
full_decay_hours = 48.0

[feature_toggles]
scheduler = false
"#;
    let config = EngineConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.algorithm_config.max_score, 95.0);
    assert_eq!(config.algorithm_config.time_decay.full_decay_hours, 48.0);
    assert!(!config.feature_toggles.scheduler);
}

#[test]
fn merged_patch_applies_on_top_of_current() {
    let base = EngineConfig::from_value(json!({ "maxScore": 90 })).unwrap();
    let merged = base
        .merged(json!({ "thresholds": { "activeMinScore": 75 } }))
        .unwrap();
    assert_eq!(merged.algorithm_config.max_score, 90.0);
    assert_eq!(merged.algorithm_config.thresholds.active_min_score, 75.0);
    assert_eq!(merged.algorithm_config.thresholds.cold_min_score, 30.0);
}

#[test]
fn config_serde_roundtrip_through_value() {
    let config = EngineConfig::default();
    let back = EngineConfig::from_value(config.to_value()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn observability_config_from_partial_toml() {
    let config = ObservabilityConfig::from_toml(
        r#"
log_level = "debug"
log_target = "file"
max_generations = 2
alert_sinks = ["console", "file"]
"#,
    )
    .unwrap();
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.log_target, LogTarget::File);
    assert_eq!(config.max_generations, 2);
    assert_eq!(config.alert_sinks, vec![AlertSinkKind::Console, AlertSinkKind::File]);
    assert_eq!(config.rules, default_rules());
}

#[test]
fn observability_rule_with_inverted_severity_rejected() {
    let result = ObservabilityConfig::from_toml(
        r#"
[[rules]]
metric = "failed_batches"
warning = 10.0
critical = 1.0
"#,
    );
    assert!(result.is_err());
}
