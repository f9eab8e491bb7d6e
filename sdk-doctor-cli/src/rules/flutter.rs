//! Flutter rule table (pubspec.yaml + Dart sources).

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
    if signals.root_manifest(ManifestKind::Pubspec).is_none() {
        return vec![Finding::error(CONFIGURATION, "pubspec.yaml not found")
            .suggest("Run sdk-doctor from the root of your Flutter project")];
    }

    match common::first_dependency(signals, &[ManifestKind::Pubspec]) {
        Some(decl) => common::dependency_found(decl, "pubspec.yaml"),
        None => vec![Finding::error(
            DEPENDENCY_CATEGORY,
            "TrustArc package not found in pubspec.yaml",
        )
        .suggest("Add the TrustArc Flutter SDK to dependencies in pubspec.yaml")],
    }
}

fn usage(signals: &PlatformSignals) -> Vec<Finding> {
    common::usage(signals, "Dart files")
}
