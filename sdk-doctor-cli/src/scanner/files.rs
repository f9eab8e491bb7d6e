//! Project file discovery and bounded reads.
//!
//! Walks the project once, classifies every file by name or extension, and
//! skips build output, package-manager caches and IDE state. Nothing here
//! interprets file content.

use crate::config::ScanConfig;
use ignore::WalkBuilder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory names never descended into, regardless of platform
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    // Android / Gradle
    ".gradle",
    ".cxx",
    ".idea",
    ".externalNativeBuild",
    // iOS / Xcode
    "DerivedData",
    "Pods",
    "Carthage",
    ".build",
    "xcuserdata",
    ".swiftpm",
    // React Native / JS
    "node_modules",
    ".expo",
    "dist",
    // Flutter / Dart
    ".dart_tool",
    ".pub-cache",
    ".fvm",
    ".symlinks",
    // General
    ".git",
    "target",
];

/// Files that make a sibling `build` directory tool output
const BUILD_DIR_OWNERS: &[&str] = &[
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "settings.gradle.kts",
    "pubspec.yaml",
    "package.json",
    "Package.swift",
    "Podfile",
];

/// A `build` directory next to a Gradle, Flutter, npm or CocoaPods/SPM
/// manifest. Package directories such as `com/acme/build` are kept.
fn is_build_output(dir: &Path) -> bool {
    dir.file_name().is_some_and(|name| name == "build")
        && dir
            .parent()
            .is_some_and(|parent| BUILD_DIR_OWNERS.iter().any(|f| parent.join(f).is_file()))
}

/// Build and dependency manifests the scanner understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    Gradle,
    GradleSettings,
    AndroidManifest,
    SwiftPackage,
    Podfile,
    PackageJson,
    Pubspec,
}

impl ManifestKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "build.gradle" | "build.gradle.kts" => Some(ManifestKind::Gradle),
            "settings.gradle" | "settings.gradle.kts" => Some(ManifestKind::GradleSettings),
            "AndroidManifest.xml" => Some(ManifestKind::AndroidManifest),
            "Package.swift" => Some(ManifestKind::SwiftPackage),
            "Podfile" => Some(ManifestKind::Podfile),
            "package.json" => Some(ManifestKind::PackageJson),
            "pubspec.yaml" => Some(ManifestKind::Pubspec),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ManifestKind::Gradle => "build.gradle",
            ManifestKind::GradleSettings => "settings.gradle",
            ManifestKind::AndroidManifest => "AndroidManifest.xml",
            ManifestKind::SwiftPackage => "Package.swift",
            ManifestKind::Podfile => "Podfile",
            ManifestKind::PackageJson => "package.json",
            ManifestKind::Pubspec => "pubspec.yaml",
        }
    }
}

/// Source languages the scanner collects evidence from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Language {
    Kotlin,
    Java,
    Swift,
    ObjectiveC,
    JavaScript,
    TypeScript,
    Dart,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Kotlin,
        Language::Java,
        Language::Swift,
        Language::ObjectiveC,
        Language::JavaScript,
        Language::TypeScript,
        Language::Dart,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "kt" | "kts" => Some(Language::Kotlin),
            "java" => Some(Language::Java),
            "swift" => Some(Language::Swift),
            "m" | "mm" => Some(Language::ObjectiveC),
            "js" | "jsx" | "mjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "dart" => Some(Language::Dart),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::Kotlin => "kotlin",
            Language::Java => "java",
            Language::Swift => "swift",
            Language::ObjectiveC => "objective-c",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Dart => "dart",
        }
    }
}

/// Everything found by one walk, paths relative to the root
#[derive(Debug, Default)]
pub struct ProjectFiles {
    pub manifests: Vec<(ManifestKind, PathBuf)>,
    pub sources: Vec<(Language, PathBuf)>,
    /// `.xcodeproj` / `.xcworkspace` bundles
    pub xcode_markers: Vec<PathBuf>,
}

impl ProjectFiles {
    pub fn sources_in(&self, languages: &[Language]) -> impl Iterator<Item = &(Language, PathBuf)> {
        let languages = languages.to_vec();
        self.sources
            .iter()
            .filter(move |(lang, _)| languages.contains(lang))
    }

    pub fn root_manifest(&self, kind: ManifestKind) -> Option<&Path> {
        self.manifests
            .iter()
            .find(|(k, p)| *k == kind && p.parent().is_some_and(|parent| parent.as_os_str().is_empty()))
            .map(|(_, p)| p.as_path())
    }
}

fn is_xcode_bundle(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("xcodeproj") | Some("xcworkspace")
    )
}

/// Walk the project tree in file-name order.
///
/// Order is stable for an unchanged tree, which keeps finding order stable.
pub fn collect_project_files(root: &Path, config: &ScanConfig) -> ProjectFiles {
    let excluded: Vec<String> = DEFAULT_EXCLUDED_DIRS
        .iter()
        .map(|s| s.to_string())
        .chain(config.exclude.iter().cloned())
        .collect();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && (excluded.iter().any(|name| entry.file_name() == name.as_str())
                    || is_build_output(entry.path())))
        });

    let mut files = ProjectFiles::default();

    for entry in builder.build().flatten() {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());

        if is_dir {
            if is_xcode_bundle(path) {
                files.xcode_markers.push(relative.to_path_buf());
            }
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(kind) = ManifestKind::from_file_name(name) {
            files.manifests.push((kind, relative.to_path_buf()));
        } else if let Some(lang) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
        {
            files.sources.push((lang, relative.to_path_buf()));
        }
    }

    debug!(
        "Walked {}: {} manifests, {} sources, {} xcode bundles",
        root.display(),
        files.manifests.len(),
        files.sources.len(),
        files.xcode_markers.len()
    );
    files
}

/// First `max_lines` lines of a file, and whether more lines followed.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_head(path: &Path, max_lines: usize) -> io::Result<(Vec<String>, bool)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::with_capacity(max_lines.min(256));
    let mut buf = Vec::new();

    while lines.len() < max_lines {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok((lines, false));
        }
        let line = String::from_utf8_lossy(&buf);
        lines.push(line.trim_end_matches(['\n', '\r']).to_string());
    }

    buf.clear();
    let truncated = reader.read_until(b'\n', &mut buf)? > 0;
    Ok((lines, truncated))
}

/// Whole file content up to `max_bytes`.
pub fn read_capped(path: &Path, max_bytes: u64) -> io::Result<String> {
    let mut buf = Vec::new();
    File::open(path)?.take(max_bytes).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
