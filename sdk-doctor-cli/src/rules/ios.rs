//! iOS rule table (Package.swift / Podfile + Swift and Objective-C sources).

use super::common;
use super::engine::Rule;
use crate::models::Finding;
use crate::scanner::signals::IOS_MODULE;
use crate::scanner::{ManifestKind, PlatformSignals};
use crate::scoring::DEPENDENCY_CATEGORY;

pub static RULES: &[Rule] = &[
    Rule { id: "dependency", check: dependency },
    Rule { id: "import", check: import },
    Rule { id: "instantiation", check: common::instantiation },
    Rule { id: "start-called", check: common::start_called },
    Rule { id: "init-order", check: common::init_order },
    Rule { id: "start-domain", check: common::start_domain },
    Rule { id: "debug-log", check: common::debug_log },
];

/// Swift Package Manager first, then CocoaPods
fn dependency(signals: &PlatformSignals) -> Vec<Finding> {
    match common::first_dependency(signals, &[ManifestKind::SwiftPackage, ManifestKind::Podfile]) {
        Some(decl) => common::dependency_found(decl, decl.manifest.display_name()),
        None => vec![Finding::error(
            DEPENDENCY_CATEGORY,
            "TrustArc SDK dependency not found in Package.swift or Podfile",
        )
        .suggest(format!(
            "Add the {IOS_MODULE} package with Swift Package Manager, or `pod '{IOS_MODULE}'` to your Podfile"
        ))],
    }
}

fn import(signals: &PlatformSignals) -> Vec<Finding> {
    common::import(signals, "Swift/Objective-C")
}
