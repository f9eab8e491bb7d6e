//! Platform detection from root-level markers.

use super::files::{Language, ManifestKind, ProjectFiles};
use crate::models::Platform;

/// Manifest content loaded once per scan
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub kind: ManifestKind,
    pub path: std::path::PathBuf,
    pub content: String,
}

impl LoadedManifest {
    fn is_root(&self) -> bool {
        self.path.parent().is_some_and(|p| p.as_os_str().is_empty())
    }
}

fn root_content(manifests: &[LoadedManifest], kind: ManifestKind) -> Option<&str> {
    manifests
        .iter()
        .find(|m| m.kind == kind && m.is_root())
        .map(|m| m.content.as_str())
}

fn package_json_is_react_native(content: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => ["dependencies", "devDependencies"].iter().any(|section| {
            value
                .get(section)
                .and_then(|d| d.as_object())
                .is_some_and(|deps| deps.contains_key("react-native"))
        }),
        // A broken package.json still names its dependencies; keep the
        // platform so the dependency rule can report the parse failure.
        Err(_) => content.contains("\"react-native\""),
    }
}

/// Detect the platform, first match wins:
/// flutter, react-native, ios, android, unknown.
pub fn detect_platform(files: &ProjectFiles, manifests: &[LoadedManifest]) -> Platform {
    if root_content(manifests, ManifestKind::Pubspec)
        .is_some_and(|c| c.to_lowercase().contains("flutter"))
    {
        return Platform::Flutter;
    }

    if root_content(manifests, ManifestKind::PackageJson).is_some_and(package_json_is_react_native) {
        return Platform::ReactNative;
    }

    if !files.xcode_markers.is_empty() || files.root_manifest(ManifestKind::Podfile).is_some() {
        return Platform::Ios;
    }

    if files.manifests.iter().any(|(kind, _)| *kind == ManifestKind::Gradle) {
        return Platform::Android;
    }

    Platform::Unknown
}

/// Manifest kinds whose content feeds a platform's rule table
pub fn manifest_kinds(platform: Platform) -> &'static [ManifestKind] {
    match platform {
        Platform::Android => &[ManifestKind::Gradle, ManifestKind::AndroidManifest],
        Platform::Ios => &[ManifestKind::SwiftPackage, ManifestKind::Podfile],
        Platform::ReactNative => &[ManifestKind::PackageJson],
        Platform::Flutter => &[ManifestKind::Pubspec],
        Platform::Unknown => &[],
    }
}

/// Source languages scanned for a platform
pub fn source_languages(platform: Platform) -> &'static [Language] {
    match platform {
        Platform::Android => &[Language::Kotlin, Language::Java],
        Platform::Ios => &[Language::Swift, Language::ObjectiveC],
        Platform::ReactNative => &[Language::JavaScript, Language::TypeScript],
        Platform::Flutter => &[Language::Dart],
        Platform::Unknown => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn loaded(kind: ManifestKind, path: &str, content: &str) -> LoadedManifest {
        LoadedManifest {
            kind,
            path: PathBuf::from(path),
            content: content.to_string(),
        }
    }

    fn files_with(manifests: &[(ManifestKind, &str)]) -> ProjectFiles {
        ProjectFiles {
            manifests: manifests.iter().map(|(k, p)| (*k, PathBuf::from(p))).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_flutter_wins_over_nested_android() {
        let files = files_with(&[
            (ManifestKind::Pubspec, "pubspec.yaml"),
            (ManifestKind::Gradle, "android/app/build.gradle"),
        ]);
        let manifests = vec![loaded(
            ManifestKind::Pubspec,
            "pubspec.yaml",
            "dependencies:\n  flutter:\n    sdk: flutter\n",
        )];
        assert_eq!(detect_platform(&files, &manifests), Platform::Flutter);
    }

    #[test]
    fn test_react_native_from_dev_dependencies() {
        let files = files_with(&[(ManifestKind::PackageJson, "package.json")]);
        let manifests = vec![loaded(
            ManifestKind::PackageJson,
            "package.json",
            r#"{"devDependencies": {"react-native": "0.74.0"}}"#,
        )];
        assert_eq!(detect_platform(&files, &manifests), Platform::ReactNative);
    }

    #[test]
    fn test_plain_node_package_is_not_react_native() {
        let files = files_with(&[(ManifestKind::PackageJson, "package.json")]);
        let manifests = vec![loaded(
            ManifestKind::PackageJson,
            "package.json",
            r#"{"dependencies": {"express": "4.0.0"}}"#,
        )];
        assert_eq!(detect_platform(&files, &manifests), Platform::Unknown);
    }

    #[test]
    fn test_ios_from_xcode_marker() {
        let mut files = files_with(&[]);
        files.xcode_markers.push(PathBuf::from("App.xcodeproj"));
        assert_eq!(detect_platform(&files, &[]), Platform::Ios);
    }

    #[test]
    fn test_android_from_nested_gradle() {
        let files = files_with(&[(ManifestKind::Gradle, "app/build.gradle.kts")]);
        assert_eq!(detect_platform(&files, &[]), Platform::Android);
    }

    #[test]
    fn test_nested_pubspec_does_not_count() {
        let files = files_with(&[(ManifestKind::Pubspec, "packages/x/pubspec.yaml")]);
        let manifests = vec![loaded(ManifestKind::Pubspec, "packages/x/pubspec.yaml", "flutter:")];
        assert_eq!(detect_platform(&files, &manifests), Platform::Unknown);
    }
}
