//! React Native rule table (package.json + JS/TS sources).

use super::common::{self, CONFIGURATION};
use super::engine::Rule;
use crate::models::Finding;
use crate::scanner::{ManifestKind, PlatformSignals};
use crate::scoring::DEPENDENCY_CATEGORY;

pub static RULES: &[Rule] = &[
    Rule { id: "dependency", check: dependency },
    Rule { id: "usage", check: usage },
    Rule { id: "start-called", check: common::initialize_called },
    Rule { id: "init-order", check: common::init_order },
];

fn dependency(signals: &PlatformSignals) -> Vec<Finding> {
    if !signals.has_manifest(ManifestKind::PackageJson) {
        return vec![Finding::error(CONFIGURATION, "package.json not found")
            .suggest("Run sdk-doctor from the root of your React Native project")];
    }

    let issues = common::manifest_issues(signals, ManifestKind::PackageJson);
    if !issues.is_empty() {
        return issues;
    }

    match common::first_dependency(signals, &[ManifestKind::PackageJson]) {
        Some(decl) => common::dependency_found(decl, "package.json"),
        None => vec![Finding::error(
            DEPENDENCY_CATEGORY,
            "TrustArc package not found in dependencies",
        )
        .suggest("Add the TrustArc React Native SDK to package.json")],
    }
}

fn usage(signals: &PlatformSignals) -> Vec<Finding> {
    common::usage(signals, "JavaScript/TypeScript files")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, Severity};
    use crate::rules::common::fixtures::{signals, site, source};
    use crate::rules::RuleEngine;
    use crate::scanner::{DependencyDecl, Language, ManifestIssue, ManifestRef};
    use std::path::PathBuf;

    fn with_package_json() -> PlatformSignals {
        let mut s = signals(Platform::ReactNative);
        s.manifests.push(ManifestRef {
            kind: ManifestKind::PackageJson,
            path: PathBuf::from("package.json"),
        });
        s
    }

    #[test]
    fn test_parse_failure_is_configuration_error() {
        let mut s = with_package_json();
        s.manifest_issues.push(ManifestIssue {
            path: PathBuf::from("package.json"),
            message: "Error reading package.json: expected value at line 1 column 1".to_string(),
        });
        let findings = dependency(&s);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].category, "Configuration");
    }

    #[test]
    fn test_healthy_project() {
        let mut s = with_package_json();
        s.dependencies.push(DependencyDecl {
            manifest: ManifestKind::PackageJson,
            path: PathBuf::from("package.json"),
            line: 5,
            version: Some("^1.4.0".to_string()),
        });
        let mut ev = source("src/App.tsx", Language::TypeScript);
        ev.starts.push(site(4, true));
        ev.opens.push(site(10, true));
        s.sources.push(ev);

        let findings = RuleEngine::for_platform(Platform::ReactNative).evaluate(&s);
        assert!(findings.iter().all(|f| f.severity == Severity::Success), "{findings:#?}");
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_no_usage_warns_and_missing_dependency_errors() {
        let findings =
            RuleEngine::for_platform(Platform::ReactNative).evaluate(&with_package_json());
        let severities: Vec<_> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning]);
    }

    #[test]
    fn test_import_without_initialize() {
        let mut s = with_package_json();
        s.sources.push(source("index.js", Language::JavaScript));
        let findings = RuleEngine::for_platform(Platform::ReactNative).evaluate(&s);
        assert!(findings
            .iter()
            .any(|f| f.message == "TrustArc SDK imported but initialize() never called"));
    }
}
