//! Android rule table (Gradle + AndroidManifest.xml + Kotlin/Java sources).

use super::common::{self, Requirement, CONFIGURATION};
use super::engine::Rule;
use crate::models::{Finding, Severity};
use crate::scanner::signals::ANDROID_ARTIFACT;
use crate::scanner::{ManifestKind, PlatformSignals};
use crate::scoring::DEPENDENCY_CATEGORY;

/// Lowest API level the SDK supports
pub const MIN_SDK_LEVEL: u32 = 28;

const PERMISSIONS: &[Requirement] = &[
    Requirement {
        name: "android.permission.INTERNET",
        severity_when_missing: Severity::Error,
        message: "Missing required permission: INTERNET",
        suggestion: "Add: <uses-permission android:name=\"android.permission.INTERNET\" />",
    },
    Requirement {
        name: "android.permission.ACCESS_NETWORK_STATE",
        severity_when_missing: Severity::Warning,
        message: "Missing recommended permission: ACCESS_NETWORK_STATE",
        suggestion: "Add: <uses-permission android:name=\"android.permission.ACCESS_NETWORK_STATE\" />",
    },
];

pub static RULES: &[Rule] = &[
    Rule { id: "dependency", check: dependency },
    Rule { id: "min-sdk", check: min_sdk },
    Rule { id: "permissions", check: permissions },
    Rule { id: "import", check: import },
    Rule { id: "instantiation", check: common::instantiation },
    Rule { id: "start-called", check: common::start_called },
    Rule { id: "init-order", check: common::init_order },
    Rule { id: "start-domain", check: common::start_domain },
    Rule { id: "debug-log", check: common::debug_log },
    Rule { id: "consent-listener", check: consent_listener },
];

fn dependency(signals: &PlatformSignals) -> Vec<Finding> {
    match common::first_dependency(signals, &[ManifestKind::Gradle]) {
        Some(decl) => common::dependency_found(decl, "Gradle"),
        None => vec![Finding::error(
            DEPENDENCY_CATEGORY,
            "TrustArc SDK dependency not found in gradle files",
        )
        .suggest(format!("Add: implementation(\"{ANDROID_ARTIFACT}:VERSION\")"))],
    }
}

fn min_sdk(signals: &PlatformSignals) -> Vec<Finding> {
    signals
        .min_sdk
        .iter()
        .filter_map(|decl| {
            let finding = match decl.level() {
                Some(level) if level < MIN_SDK_LEVEL => Finding::error(
                    "Compatibility",
                    format!(
                        "minSdk {level} is below {MIN_SDK_LEVEL}, the minimum API level supported by the TrustArc SDK"
                    ),
                )
                .suggest(format!("Raise minSdk to {MIN_SDK_LEVEL} or higher")),
                Some(_) => return None,
                None => Finding::info(
                    "Compatibility",
                    format!(
                        "minSdk is set to `{}`; could not verify it is at least {MIN_SDK_LEVEL}",
                        decl.raw
                    ),
                ),
            };
            Some(finding.in_file(&decl.path).at_line(decl.line))
        })
        .collect()
}

fn permissions(signals: &PlatformSignals) -> Vec<Finding> {
    let mut findings =
        common::check_requirements(PERMISSIONS, "Permissions", |name| signals.has_permission(name));
    if !signals.has_manifest(ManifestKind::AndroidManifest) {
        for finding in &mut findings {
            finding.message.push_str(" (no AndroidManifest.xml found)");
        }
    }
    findings
}

fn import(signals: &PlatformSignals) -> Vec<Finding> {
    common::import(signals, "Kotlin/Java")
}

fn consent_listener(signals: &PlatformSignals) -> Vec<Finding> {
    if !signals.has_start() || signals.sources.iter().any(|s| !s.listeners.is_empty()) {
        return Vec::new();
    }
    vec![Finding::info(CONFIGURATION, "No consent listener registered")
        .suggest("Add: trustArc.addConsentListener { consents -> ... } to react to consent changes")]
}
