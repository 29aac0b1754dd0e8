use lethe_core::config::Thresholds;
use lethe_core::memory::LifecycleStatus;
use serde::{Deserialize, Serialize};

/// Map a score to its lifecycle state. First match wins:
/// `>= active_min_score` → active, `>= cold_min_score` → cold, else deprecated.
pub fn classify(score: f64, thresholds: &Thresholds) -> LifecycleStatus {
    if score >= thresholds.active_min_score {
        LifecycleStatus::Active
    } else if score >= thresholds.cold_min_score {
        LifecycleStatus::Cold
    } else {
        LifecycleStatus::Deprecated
    }
}

/// A lifecycle change observed during a decay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: LifecycleStatus,
    pub to: LifecycleStatus,
}

/// `Some` when the status changed.
pub fn transition(from: LifecycleStatus, to: LifecycleStatus) -> Option<StatusTransition> {
    (from != to).then_some(StatusTransition { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive_from_below() {
        let t = Thresholds {
            active_min_score: 70.0,
            cold_min_score: 30.0,
        };
        assert_eq!(classify(70.0, &t), LifecycleStatus::Active);
        assert_eq!(classify(69.0, &t), LifecycleStatus::Cold);
        assert_eq!(classify(30.0, &t), LifecycleStatus::Cold);
        assert_eq!(classify(29.0, &t), LifecycleStatus::Deprecated);
    }

    #[test]
    fn equal_thresholds_skip_cold() {
        let t = Thresholds {
            active_min_score: 50.0,
            cold_min_score: 50.0,
        };
        assert_eq!(classify(50.0, &t), LifecycleStatus::Active);
        assert_eq!(classify(49.9, &t), LifecycleStatus::Deprecated);
    }

    #[test]
    fn transition_only_on_change() {
        assert!(transition(LifecycleStatus::Cold, LifecycleStatus::Cold).is_none());
        let t = transition(LifecycleStatus::Active, LifecycleStatus::Cold).unwrap();
        assert_eq!(t.to, LifecycleStatus::Cold);
    }
}
