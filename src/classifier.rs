//! スコアと登録状態からのリスク判定

use crate::error::{Result, ScreenError};
use crate::scorer::ScoredMatch;
use tm_screen_common::{MarkStatus, Verdict};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    fuzzy_threshold: f64,
    high_risk_cutoff: f64,
}

impl Thresholds {
    pub fn new(fuzzy_threshold: f64, high_risk_cutoff: f64) -> Result<Self> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(fuzzy_threshold) || !in_range(high_risk_cutoff) || high_risk_cutoff < fuzzy_threshold {
            return Err(ScreenError::Config(format!(
                "invalid thresholds: fuzzy {} / high risk {}",
                fuzzy_threshold, high_risk_cutoff
            )));
        }
        Ok(Self {
            fuzzy_threshold,
            high_risk_cutoff,
        })
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    pub fn high_risk_cutoff(&self) -> f64 {
        self.high_risk_cutoff
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 75.0,
            high_risk_cutoff: 90.0,
        }
    }
}

/// 失効した商標は障害にならない。有効な商標はカットオフ以上で Blocked、
/// 閾値からカットオフ未満で Risk。
pub fn classify(score: f64, status: MarkStatus, thresholds: &Thresholds) -> Verdict {
    if !status.is_active() {
        return Verdict::Clear;
    }
    if score >= thresholds.high_risk_cutoff {
        Verdict::Blocked
    } else if score >= thresholds.fuzzy_threshold {
        Verdict::Risk
    } else {
        Verdict::Clear
    }
}

pub fn classify_match(scored: &ScoredMatch, thresholds: &Thresholds) -> Verdict {
    classify(scored.score, scored.candidate.status, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUSES: [MarkStatus; 5] = [
        MarkStatus::Live,
        MarkStatus::Registered,
        MarkStatus::Dead,
        MarkStatus::Pending,
        MarkStatus::Unknown,
    ];

    #[test]
    fn test_leapwit_is_risk() {
        assert_eq!(classify(80.0, MarkStatus::Live, &Thresholds::default()), Verdict::Risk);
    }

    #[test]
    fn test_identical_live_is_blocked() {
        assert_eq!(classify(100.0, MarkStatus::Live, &Thresholds::default()), Verdict::Blocked);
    }

    #[test]
    fn test_dead_is_always_clear() {
        let thresholds = Thresholds::default();
        assert_eq!(classify(95.0, MarkStatus::Dead, &thresholds), Verdict::Clear);
        for score in 0..=100 {
            assert_eq!(classify(score as f64, MarkStatus::Dead, &thresholds), Verdict::Clear);
        }
    }

    #[test]
    fn test_boundaries() {
        let thresholds = Thresholds::default();
        assert_eq!(classify(90.0, MarkStatus::Pending, &thresholds), Verdict::Blocked);
        assert_eq!(classify(89.99, MarkStatus::Registered, &thresholds), Verdict::Risk);
        assert_eq!(classify(75.0, MarkStatus::Registered, &thresholds), Verdict::Risk);
        assert_eq!(classify(74.99, MarkStatus::Live, &thresholds), Verdict::Clear);
    }

    #[test]
    fn test_unknown_status_is_clear() {
        assert_eq!(classify(100.0, MarkStatus::Unknown, &Thresholds::default()), Verdict::Clear);
    }

    #[test]
    fn test_total_over_grid() {
        let thresholds = Thresholds::default();
        for status in STATUSES {
            for tenth in 0..=1000 {
                let verdict = classify(tenth as f64 / 10.0, status, &thresholds);
                assert!(Verdict::ALL.contains(&verdict));
            }
        }
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(Thresholds::new(80.0, 70.0).is_err());
        assert!(Thresholds::new(-1.0, 90.0).is_err());
        assert!(Thresholds::new(75.0, 101.0).is_err());
        assert!(Thresholds::new(75.0, 75.0).is_ok());
    }
}
