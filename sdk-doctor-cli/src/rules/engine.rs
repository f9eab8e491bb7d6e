//! Rule tables and their evaluation
//!
//! Every platform owns one ordered `&'static [Rule]` table. The engine runs
//! every rule of the selected table in order and concatenates the findings;
//! nothing short-circuits and no rule can fail.

use crate::models::{Finding, Platform};
use crate::scanner::PlatformSignals;
use tracing::{debug, warn};

/// One named check over the scanned signals
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub check: fn(&PlatformSignals) -> Vec<Finding>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

/// Runs the rule table of one platform
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine {
    platform: Platform,
    rules: &'static [Rule],
}

impl RuleEngine {
    /// Select the rule table for `platform`
    pub fn for_platform(platform: Platform) -> Self {
        let rules = match platform {
            Platform::Android => super::android::RULES,
            Platform::Ios => super::ios::RULES,
            Platform::ReactNative => super::react_native::RULES,
            Platform::Flutter => super::flutter::RULES,
            Platform::Unknown => super::generic::RULES,
        };
        Self { platform, rules }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id).collect()
    }

    /// Run every rule in table order
    pub fn evaluate(&self, signals: &PlatformSignals) -> Vec<Finding> {
        if signals.platform != self.platform {
            warn!(
                "Evaluating {} rules against signals scanned as {}",
                self.platform, signals.platform
            );
        }

        let mut findings = Vec::new();
        for rule in self.rules {
            let produced = (rule.check)(signals);
            debug!("Rule {}/{}: {} findings", self.platform, rule.id, produced.len());
            findings.extend(produced);
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_android_table_order() {
        let engine = RuleEngine::for_platform(Platform::Android);
        assert_eq!(
            engine.rule_ids(),
            vec![
                "dependency",
                "min-sdk",
                "permissions",
                "import",
                "instantiation",
                "start-called",
                "init-order",
                "start-domain",
                "debug-log",
                "consent-listener",
            ]
        );
    }

    #[test]
    fn test_every_platform_has_rules() {
        for platform in [
            Platform::Android,
            Platform::Ios,
            Platform::ReactNative,
            Platform::Flutter,
            Platform::Unknown,
        ] {
            let engine = RuleEngine::for_platform(platform);
            assert!(!engine.rule_ids().is_empty(), "{platform}");
            assert_eq!(engine.platform(), platform);
        }
    }

    #[test]
    fn test_unknown_table() {
        let engine = RuleEngine::for_platform(Platform::Unknown);
        assert_eq!(engine.rule_ids(), vec!["manifest-presence", "reduced-confidence"]);
    }
}
