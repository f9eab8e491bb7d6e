//! Fallback table for projects whose platform could not be determined.

use super::engine::Rule;
use crate::models::Finding;
use crate::scanner::PlatformSignals;

const PLATFORM: &str = "Platform";

pub static RULES: &[Rule] = &[
    Rule { id: "manifest-presence", check: manifest_presence },
    Rule { id: "reduced-confidence", check: reduced_confidence },
];

fn manifest_presence(signals: &PlatformSignals) -> Vec<Finding> {
    if signals.manifests.is_empty() {
        return vec![Finding::error(PLATFORM, "No recognizable project manifest found")
            .suggest("Run sdk-doctor from the root of an iOS, Android, React Native or Flutter project")];
    }

    let mut names: Vec<&str> = signals.manifests.iter().map(|m| m.kind.display_name()).collect();
    names.dedup();
    vec![Finding::warning(
        PLATFORM,
        format!(
            "Found {} manifest(s) ({}) but could not determine the platform",
            signals.manifests.len(),
            names.join(", ")
        ),
    )
    .suggest("Point sdk-doctor at the app root that contains pubspec.yaml, package.json, the Xcode project or build.gradle")]
}

fn reduced_confidence(_signals: &PlatformSignals) -> Vec<Finding> {
    vec![Finding::info(
        PLATFORM,
        "Platform-specific checks were skipped; results have reduced confidence",
    )]
}
