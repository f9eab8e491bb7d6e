//! Integration-quality scoring
//!
//! Reduces an immutable list of findings to a single 0-100 score.
//!
//! # Scoring Formula
//!
//! ```text
//! score = baseline
//!       + dependency_bonus              (if a successful "Dependency" finding exists)
//!       - error_penalty   × errors
//!       - warning_penalty × warnings
//! score = clamp(score, 0, 100)
//! ```
//!
//! Info and success findings other than the dependency confirmation do not
//! move the score. Defaults: baseline 70, bonus 30, error 20, warning 10.
//!
//! # Example
//!
//! SDK declared, one missing recommended permission:
//! 70 + 30 - 10 = 90

use crate::config::ScoringConfig;
use crate::models::{Finding, Severity};

/// Category used by dependency checks; a success in it earns the bonus
pub const DEPENDENCY_CATEGORY: &str = "Dependency";

/// Pure scorer over a finding list
#[derive(Debug, Clone)]
pub struct Scorer {
    baseline: i64,
    dependency_bonus: i64,
    error_penalty: i64,
    warning_penalty: i64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            baseline: i64::from(config.baseline),
            dependency_bonus: i64::from(config.dependency_bonus),
            error_penalty: i64::from(config.error_penalty),
            warning_penalty: i64::from(config.warning_penalty),
        }
    }

    pub fn score(&self, findings: &[Finding]) -> u8 {
        let mut score = self.baseline;

        let dependency_found = findings
            .iter()
            .any(|f| f.severity == Severity::Success && f.category == DEPENDENCY_CATEGORY);
        if dependency_found {
            score += self.dependency_bonus;
        }

        for finding in findings {
            match finding.severity {
                Severity::Error => score -= self.error_penalty,
                Severity::Warning => score -= self.warning_penalty,
                Severity::Info | Severity::Success => {}
            }
        }

        score.clamp(0, 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep_found() -> Finding {
        Finding::success(DEPENDENCY_CATEGORY, "TrustArc SDK found (version 1.2.3)")
    }

    #[test]
    fn test_clean_project_scores_full() {
        let scorer = Scorer::default();
        assert_eq!(scorer.score(&[dep_found()]), 100);
    }

    #[test]
    fn test_penalties() {
        let scorer = Scorer::default();
        let findings = vec![
            dep_found(),
            Finding::error("Initialization", "start() never called"),
            Finding::warning("Permissions", "Missing recommended permission"),
        ];
        assert_eq!(scorer.score(&findings), 70);
    }

    #[test]
    fn test_info_and_success_do_not_move_score() {
        let scorer = Scorer::default();
        let findings = vec![
            Finding::info("Configuration", "Consider enabling debug logging"),
            Finding::success("Initialization", "Initialization order looks correct"),
        ];
        assert_eq!(scorer.score(&findings), 70);
    }

    #[test]
    fn test_missing_dependency_and_permission_fails() {
        let scorer = Scorer::default();
        let findings = vec![
            Finding::error(DEPENDENCY_CATEGORY, "TrustArc SDK dependency not found"),
            Finding::error("Permissions", "Missing required permission: INTERNET"),
        ];
        assert!(scorer.score(&findings) < 70);
    }

    #[test]
    fn test_score_is_always_clamped() {
        let scorer = Scorer::default();
        let many_errors: Vec<Finding> = (0..50)
            .map(|i| Finding::error("Initialization", format!("error {i}")))
            .collect();
        assert_eq!(scorer.score(&many_errors), 0);

        let generous = Scorer::new(&ScoringConfig {
            baseline: 100,
            dependency_bonus: 250,
            ..Default::default()
        });
        assert_eq!(generous.score(&[dep_found()]), 100);
    }

    #[test]
    fn test_clamp_holds_for_mixed_sequences() {
        let scorer = Scorer::default();
        let severities = [
            Severity::Error,
            Severity::Warning,
            Severity::Info,
            Severity::Success,
        ];
        for n in 0..12 {
            let findings: Vec<Finding> = (0..n)
                .map(|i| Finding::new(severities[i % 4], DEPENDENCY_CATEGORY, "x"))
                .collect();
            let s = scorer.score(&findings);
            assert!(s <= 100, "score {s} out of range for {n} findings");
        }
    }
}
