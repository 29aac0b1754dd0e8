// Single source of truth for all default values.

// --- Score bounds ---
pub const DEFAULT_MIN_SCORE: f64 = 0.0;
pub const DEFAULT_MAX_SCORE: f64 = 100.0;

// --- Lifecycle thresholds ---
pub const DEFAULT_ACTIVE_MIN_SCORE: f64 = 70.0;
pub const DEFAULT_COLD_MIN_SCORE: f64 = 30.0;

// --- Time decay ---
pub const DEFAULT_TIME_DECAY_MIN_FACTOR: f64 = 0.95;
pub const DEFAULT_TIME_DECAY_MAX_FACTOR: f64 = 1.0;
pub const DEFAULT_FULL_DECAY_HOURS: f64 = 720.0; // 30 days
/// Hard floor the effective time-decay factor is constrained to.
pub const TIME_DECAY_FLOOR_MIN: f64 = 0.95;
pub const TIME_DECAY_FLOOR_MAX: f64 = 1.0;

// --- Usage boost ---
pub const DEFAULT_USAGE_MAX_BOOST: f64 = 10.0;
pub const DEFAULT_USAGE_SATURATION_ACCESS_COUNT: u64 = 100;
pub const DEFAULT_USAGE_WINDOW_HOURS: f64 = 168.0; // 7 days
pub const USAGE_BOOST_CAP: f64 = 10.0;

// --- Structure boost ---
pub const DEFAULT_STRUCTURE_MAX_BOOST: f64 = 5.0;
pub const DEFAULT_STRUCTURE_SATURATION_LINK_COUNT: u64 = 50;
pub const DEFAULT_MIN_LINK_WEIGHT: f64 = 0.1;
pub const DEFAULT_MAX_LINK_WEIGHT: f64 = 1.0;
pub const STRUCTURE_BOOST_CAP: f64 = 5.0;
/// Degree at which the structural saturation curve reaches one half.
pub const STRUCTURE_HALF_SATURATION_DEGREE: f64 = 5.0;

// --- Scheduler ---
pub const DEFAULT_DECAY_INTERVAL_MS: u64 = 3_600_000; // 1 hour
pub const DEFAULT_BATCH_SIZE: usize = 500;

// --- Batch processing ---
pub const DEFAULT_BATCH_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 5_000;
pub const DEFAULT_TRANSACTION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 0;

// --- Optimistic locking ---
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 2;

// --- Config store ---
pub const DEFAULT_RELOAD_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_CONFIG_EVENT_CAPACITY: usize = 64;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE: &str = "lethe.log";
pub const DEFAULT_ALERT_FILE: &str = "lethe-alerts.log";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024; // 10 MB
pub const DEFAULT_MAX_GENERATIONS: usize = 5;
