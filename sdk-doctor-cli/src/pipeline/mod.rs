//! Diagnostic pipeline
//!
//! Orchestrates one diagnostic run:
//! 1. Scan the project tree into platform signals
//! 2. Run the platform's rule table
//! 3. Score the findings and assemble the report

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::models::Report;
use crate::rules::RuleEngine;
use crate::scanner::{self, ScanError, ScanStats};
use crate::scoring::Scorer;

/// Full diagnostic pipeline.
pub struct Pipeline<'a> {
    config: &'a ProjectConfig,
}

/// Statistics from one run
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub scan: ScanStats,
    pub rules_run: usize,
    pub findings: usize,
    pub elapsed_ms: u128,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    /// Run scan, rules and scoring for `root`.
    pub fn run(&self, root: &Path) -> Result<(Report, RunStats), ScanError> {
        let started = Instant::now();

        let signals = scanner::scan(root, &self.config.scan)?;
        let engine = RuleEngine::for_platform(signals.platform);
        let findings = engine.evaluate(&signals);

        let stats = RunStats {
            scan: signals.stats,
            rules_run: engine.rule_ids().len(),
            findings: findings.len(),
            elapsed_ms: started.elapsed().as_millis(),
        };

        let report = Report::build(
            signals.platform,
            root,
            findings,
            &Scorer::new(&self.config.scoring),
        );

        info!(
            "Diagnosed {} project in {}ms: score {}, {} findings",
            report.platform, stats.elapsed_ms, report.score, stats.findings
        );
        debug!("Run stats: {:?}", stats);
        Ok((report, stats))
    }
}

/// Scan, evaluate and score a project with the given configuration
pub fn diagnose(root: &Path, config: &ProjectConfig) -> Result<Report, ScanError> {
    Pipeline::new(config).run(root).map(|(report, _)| report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, Severity};
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_invalid_path_produces_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let result = diagnose(&dir.path().join("nope"), &ProjectConfig::default());
        assert!(matches!(result, Err(ScanError::InvalidProjectPath(_))));
    }

    #[test]
    fn test_failing_android_project() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app/build.gradle", "android { defaultConfig { minSdk 21 } }\n");
        write(dir.path(), "app/src/main/AndroidManifest.xml", "<manifest/>\n");

        let report = diagnose(dir.path(), &ProjectConfig::default()).unwrap();
        assert_eq!(report.platform, Platform::Android);
        assert!(report.score < 70);
        assert!(report
            .findings_with(Severity::Error)
            .any(|f| f.category == "Compatibility" && f.message.contains("28")));
    }

    #[test]
    fn test_rerun_is_deterministic_apart_from_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pubspec.yaml", "dependencies:\n  flutter:\n    sdk: flutter\n  trustarc_flutter: ^1.0.0\n");
        write(dir.path(), "lib/main.dart", "import 'package:trustarc_flutter/trustarc.dart';\n");

        let config = ProjectConfig::default();
        let first = diagnose(dir.path(), &config).unwrap();
        let second = diagnose(dir.path(), &config).unwrap();
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.score, second.score);
    }

    #[test]
    fn test_configured_magnitudes_apply() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ProjectConfig::default();
        config.scoring.error_penalty = 50;
        let report = diagnose(dir.path(), &config).unwrap();
        // Unknown platform, empty tree: one error, one info
        assert_eq!(report.score, 20);
    }
}
