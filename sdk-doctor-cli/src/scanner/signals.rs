//! Structured evidence extracted from manifests and source heads.
//!
//! Patterns run here, once per file. Rules only ever look at the types in
//! this module.

use super::files::{Language, ManifestKind};
use crate::models::Platform;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Maven coordinate of the Android SDK artifact
pub const ANDROID_ARTIFACT: &str = "com.trustarc:trustarc-consent-sdk";
/// Kotlin/Java package of the Android SDK
pub const ANDROID_PACKAGE: &str = "com.truste.androidmobileconsentsdk";
/// Swift module / CocoaPod name of the iOS SDK
pub const IOS_MODULE: &str = "TrustArcMobileConsent";
/// SPM repository slug of the iOS SDK
pub const IOS_SPM_SLUG: &str = "trustarc-mobile-consent";

/// A manifest file that was found and read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRef {
    pub kind: ManifestKind,
    pub path: PathBuf,
}

/// A manifest that exists but could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIssue {
    pub path: PathBuf,
    pub message: String,
}

/// An SDK dependency declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    pub manifest: ManifestKind,
    pub path: PathBuf,
    pub line: u32,
    /// Raw version token as written, if any
    pub version: Option<String>,
}

/// A `<uses-permission>` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDecl {
    pub name: String,
    pub path: PathBuf,
    pub line: u32,
}

/// A `minSdk` / `minSdkVersion` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinSdkDecl {
    pub path: PathBuf,
    pub line: u32,
    pub raw: String,
}

impl MinSdkDecl {
    pub fn level(&self) -> Option<u32> {
        self.raw.parse().ok()
    }
}

/// A call site of an SDK operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// 1-based line number
    pub line: u32,
    /// Constructor received a mode / start received a domain
    pub configured: bool,
}

/// SDK usage evidence for one source file that mentions the SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEvidence {
    pub path: PathBuf,
    pub language: Language,
    pub import_line: Option<u32>,
    pub constructions: Vec<CallSite>,
    pub starts: Vec<CallSite>,
    pub opens: Vec<CallSite>,
    pub debug_logs: Vec<CallSite>,
    pub listeners: Vec<CallSite>,
}

impl SourceEvidence {
    fn new(path: PathBuf, language: Language) -> Self {
        Self {
            path,
            language,
            import_line: None,
            constructions: Vec::new(),
            starts: Vec::new(),
            opens: Vec::new(),
            debug_logs: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn first_construction(&self) -> Option<u32> {
        self.constructions.first().map(|c| c.line)
    }

    pub fn first_start(&self) -> Option<u32> {
        self.starts.first().map(|c| c.line)
    }

    pub fn first_open(&self) -> Option<u32> {
        self.opens.first().map(|c| c.line)
    }
}

/// Counters describing how much of the tree was read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub source_files: usize,
    pub truncated_files: usize,
    pub unreadable_files: usize,
}

/// Evidence grouped by category, consumed by the rule engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSignals {
    pub platform: Platform,
    pub root: PathBuf,
    pub manifests: Vec<ManifestRef>,
    pub manifest_issues: Vec<ManifestIssue>,
    pub dependencies: Vec<DependencyDecl>,
    pub permissions: Vec<PermissionDecl>,
    pub min_sdk: Vec<MinSdkDecl>,
    pub sources: Vec<SourceEvidence>,
    pub stats: ScanStats,
}

impl PlatformSignals {
    pub fn has_manifest(&self, kind: ManifestKind) -> bool {
        self.manifests.iter().any(|m| m.kind == kind)
    }

    pub fn root_manifest(&self, kind: ManifestKind) -> Option<&ManifestRef> {
        self.manifests
            .iter()
            .find(|m| m.kind == kind && m.path.parent().is_some_and(|p| p.as_os_str().is_empty()))
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == name)
    }

    pub fn has_construction(&self) -> bool {
        self.sources.iter().any(|s| !s.constructions.is_empty())
    }

    pub fn has_start(&self) -> bool {
        self.sources.iter().any(|s| !s.starts.is_empty())
    }

    pub fn has_import(&self) -> bool {
        self.sources.iter().any(|s| s.import_line.is_some())
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

fn gradle_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"trustarc-consent-sdk["']?\s*:\s*["']?([^"'\s)]+)"#)
}

fn min_sdk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\bminSdk(?:Version)?\b\s*[=(]?\s*([A-Za-z0-9_.]+)")
}

fn permission_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r#"<uses-permission(?:-sdk-23)?\b[^>]*?android:name\s*=\s*"([^"]+)""#,
    )
}

fn spm_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?:from|exact|upToNextMajor\(from|upToNextMinor\(from):\s*"([^"]+)""#)
}

fn podfile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r#"pod\s+['"]TrustArcMobileConsent[^'"]*['"](?:\s*,\s*['"]([^'"]+)['"])?"#,
    )
}

fn pubspec_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^\s*(trustarc[\w-]*)\s*:\s*([^\s#]*)")
}

fn line_of(content: &str, byte_offset: usize) -> u32 {
    content[..byte_offset].matches('\n').count() as u32 + 1
}

/// Collects SDK declarations and Android metadata from one manifest
pub fn extract_manifest(
    kind: ManifestKind,
    path: &Path,
    content: &str,
    signals: &mut PlatformSignals,
) {
    match kind {
        ManifestKind::Gradle => {
            extract_gradle_dependency(path, content, signals);
            extract_min_sdk(path, content, signals);
        }
        ManifestKind::GradleSettings => {}
        ManifestKind::AndroidManifest => extract_permissions(path, content, signals),
        ManifestKind::SwiftPackage => extract_spm_dependency(path, content, signals),
        ManifestKind::Podfile => extract_pod_dependency(path, content, signals),
        ManifestKind::PackageJson => extract_package_json(path, content, signals),
        ManifestKind::Pubspec => extract_pubspec(path, content, signals),
    }
}

fn extract_gradle_dependency(path: &Path, content: &str, signals: &mut PlatformSignals) {
    for (idx, line) in content.lines().enumerate() {
        if !line.contains(ANDROID_ARTIFACT) {
            continue;
        }
        let version = gradle_version_re()
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        signals.dependencies.push(DependencyDecl {
            manifest: ManifestKind::Gradle,
            path: path.to_path_buf(),
            line: idx as u32 + 1,
            version,
        });
    }
}

fn extract_min_sdk(path: &Path, content: &str, signals: &mut PlatformSignals) {
    for (idx, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("//") {
            continue;
        }
        if let Some(raw) = min_sdk_re().captures(line).and_then(|c| c.get(1)) {
            signals.min_sdk.push(MinSdkDecl {
                path: path.to_path_buf(),
                line: idx as u32 + 1,
                raw: raw.as_str().to_string(),
            });
        }
    }
}

fn extract_permissions(path: &Path, content: &str, signals: &mut PlatformSignals) {
    for caps in permission_re().captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        signals.permissions.push(PermissionDecl {
            name: name.as_str().to_string(),
            path: path.to_path_buf(),
            line: line_of(content, whole.start()),
        });
    }
}

fn extract_spm_dependency(path: &Path, content: &str, signals: &mut PlatformSignals) {
    for (idx, line) in content.lines().enumerate() {
        if !(line.contains(IOS_MODULE) || line.contains(IOS_SPM_SLUG)) {
            continue;
        }
        // `.product(name: "TrustArcMobileConsent", ...)` lines repeat the module
        // name without a version; only `.package(...)` lines declare one.
        if line.contains(".product(") {
            continue;
        }
        let version = spm_version_re()
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        signals.dependencies.push(DependencyDecl {
            manifest: ManifestKind::SwiftPackage,
            path: path.to_path_buf(),
            line: idx as u32 + 1,
            version,
        });
    }
}

fn extract_pod_dependency(path: &Path, content: &str, signals: &mut PlatformSignals) {
    for (idx, line) in content.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        if let Some(caps) = podfile_re().captures(line) {
            signals.dependencies.push(DependencyDecl {
                manifest: ManifestKind::Podfile,
                path: path.to_path_buf(),
                line: idx as u32 + 1,
                version: caps.get(1).map(|m| m.as_str().to_string()),
            });
        }
    }
}

fn extract_package_json(path: &Path, content: &str, signals: &mut PlatformSignals) {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            signals.manifest_issues.push(ManifestIssue {
                path: path.to_path_buf(),
                message: format!("Error reading package.json: {e}"),
            });
            return;
        }
    };

    for section in ["dependencies", "devDependencies"] {
        let Some(deps) = value.get(section).and_then(|d| d.as_object()) else {
            continue;
        };
        for (name, version) in deps {
            if !name.to_lowercase().contains("trustarc") {
                continue;
            }
            let needle = format!("\"{name}\"");
            let line = content
                .lines()
                .position(|l| l.contains(&needle))
                .map_or(1, |i| i as u32 + 1);
            signals.dependencies.push(DependencyDecl {
                manifest: ManifestKind::PackageJson,
                path: path.to_path_buf(),
                line,
                version: version.as_str().map(str::to_string),
            });
        }
    }
}

fn extract_pubspec(path: &Path, content: &str, signals: &mut PlatformSignals) {
    for (idx, line) in content.lines().enumerate() {
        if let Some(caps) = pubspec_re().captures(line) {
            let version = caps
                .get(2)
                .map(|m| m.as_str().trim_matches(|c| c == '"' || c == '\''))
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            signals.dependencies.push(DependencyDecl {
                manifest: ManifestKind::Pubspec,
                path: path.to_path_buf(),
                line: idx as u32 + 1,
                version,
            });
        }
    }
}

/// Per-language call patterns
struct SourcePatterns {
    import: &'static Regex,
    construction: Option<&'static Regex>,
    start: &'static Regex,
}

fn patterns_for(language: Language) -> SourcePatterns {
    static NATIVE_ANDROID_IMPORT: OnceLock<Regex> = OnceLock::new();
    static SWIFT_IMPORT: OnceLock<Regex> = OnceLock::new();
    static OBJC_IMPORT: OnceLock<Regex> = OnceLock::new();
    static JS_IMPORT: OnceLock<Regex> = OnceLock::new();
    static DART_IMPORT: OnceLock<Regex> = OnceLock::new();
    static CONSTRUCTION: OnceLock<Regex> = OnceLock::new();
    static OBJC_CONSTRUCTION: OnceLock<Regex> = OnceLock::new();
    static NATIVE_START: OnceLock<Regex> = OnceLock::new();
    static CROSS_START: OnceLock<Regex> = OnceLock::new();

    let construction = regex(&CONSTRUCTION, r"\bTrustArc\s*\(");
    let native_start = regex(&NATIVE_START, r"\.start\s*\(");
    let cross_start = regex(&CROSS_START, r"\.(?:initialize|start)\s*\(");

    match language {
        Language::Kotlin | Language::Java => SourcePatterns {
            import: regex(
                &NATIVE_ANDROID_IMPORT,
                r"^\s*import\s+com\.truste\.androidmobileconsentsdk\b",
            ),
            construction: Some(construction),
            start: native_start,
        },
        Language::Swift => SourcePatterns {
            import: regex(&SWIFT_IMPORT, r"^\s*import\s+TrustArcMobileConsent\b"),
            construction: Some(construction),
            start: native_start,
        },
        Language::ObjectiveC => SourcePatterns {
            import: regex(
                &OBJC_IMPORT,
                r"^\s*(?:@import\s+TrustArcMobileConsent\b|#import\s+<TrustArcMobileConsent/)",
            ),
            construction: Some(regex(
                &OBJC_CONSTRUCTION,
                r"\[\s*\[\s*TrustArc\s+alloc\s*\]|\[\s*TrustArc\s+new\s*\]",
            )),
            start: regex(&NATIVE_START, r"\.start\s*\("),
        },
        Language::JavaScript | Language::TypeScript => SourcePatterns {
            import: regex(
                &JS_IMPORT,
                r#"(?i)(?:^\s*import\b.*['"][^'"]*trustarc[^'"]*['"]|require\(\s*['"][^'"]*trustarc)"#,
            ),
            construction: None,
            start: cross_start,
        },
        Language::Dart => SourcePatterns {
            import: regex(&DART_IMPORT, r#"(?i)^\s*import\s+['"]package:trustarc"#),
            construction: None,
            start: cross_start,
        },
    }
}

fn constructor_configured(line: &str) -> bool {
    let lower = line.to_lowercase();
    if lower.contains("sdkmode") || lower.contains("sdk_mode") || lower.contains("mode:") {
        return true;
    }
    // Two or more constructor arguments: context plus mode
    line.split_once("TrustArc")
        .and_then(|(_, rest)| rest.split_once('('))
        .map(|(_, args)| args.split(')').next().unwrap_or("").contains(','))
        .unwrap_or(false)
}

fn start_configured(line: &str, start_match_end: usize) -> bool {
    line[start_match_end..]
        .trim_start()
        .chars()
        .next()
        .is_some_and(|c| c != ')')
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*")
}

/// Names that hold an SDK instance or module in one file.
///
/// Covers assignments from the constructor, `TrustArc`-typed declarations
/// and the local names an import binds the module to.
fn sdk_receivers(language: Language, lines: &[String], import: &Regex) -> Vec<String> {
    static ASSIGNED: OnceLock<Regex> = OnceLock::new();
    static ANNOTATED: OnceLock<Regex> = OnceLock::new();
    static JAVA_TYPED: OnceLock<Regex> = OnceLock::new();
    static JS_DEFAULT: OnceLock<Regex> = OnceLock::new();
    static JS_NAMED: OnceLock<Regex> = OnceLock::new();
    static JS_REQUIRE: OnceLock<Regex> = OnceLock::new();
    static DART_ALIAS: OnceLock<Regex> = OnceLock::new();

    let patterns = [
        regex(
            &ASSIGNED,
            r"(\w+)\s*(?::\s*[\w.]+[?!]?)?\s*=\s*(?:new\s+)?(?:\[\s*\[\s*)?TrustArc\b\s*[(\s]",
        ),
        regex(&ANNOTATED, r"(\w+)\s*:\s*TrustArc\b[?!]?\s*(?:$|[=;,){])"),
        regex(&JAVA_TYPED, r"\bTrustArc\s+\*?\s*(\w+)\s*[;=,)]"),
    ];

    let mut receivers: Vec<String> = Vec::new();
    let mut add = |name: &str| {
        if !name.is_empty() && !receivers.iter().any(|r| r == name) {
            receivers.push(name.to_string());
        }
    };

    for line in lines.iter().filter(|l| !is_comment(l)) {
        for re in &patterns {
            for caps in re.captures_iter(line) {
                if let Some(name) = caps.get(1) {
                    add(name.as_str());
                }
            }
        }
        if !import.is_match(line) {
            continue;
        }
        match language {
            Language::JavaScript | Language::TypeScript => {
                let default_import = regex(&JS_DEFAULT, r"^\s*import\s+(?:\*\s+as\s+)?(\w+)");
                let require = regex(&JS_REQUIRE, r"(?:const|let|var)\s+(\w+)\s*=\s*require");
                for re in [default_import, require] {
                    if let Some(name) = re.captures(line).and_then(|c| c.get(1)) {
                        add(name.as_str());
                    }
                }
                let named = regex(&JS_NAMED, r"\{([^}]*)\}");
                if let Some(list) = named.captures(line).and_then(|c| c.get(1)) {
                    for item in list.as_str().split(',') {
                        // `{ TrustArc as Consent }` binds the last word
                        if let Some(name) = item.split_whitespace().last() {
                            add(name);
                        }
                    }
                }
            }
            Language::Dart => {
                if let Some(name) = regex(&DART_ALIAS, r"\bas\s+(\w+)")
                    .captures(line)
                    .and_then(|c| c.get(1))
                {
                    add(name.as_str());
                }
            }
            _ => {}
        }
    }
    receivers
}

/// The receiver expression ending right before a `.method(` call.
///
/// Walks back over identifiers, member access and balanced call parens, so
/// `TrustArc.getInstance().start(` yields `TrustArc.getInstance()`.
fn receiver_before(prefix: &str) -> &str {
    let mut depth = 0usize;
    let mut start = prefix.len();
    for (i, c) in prefix.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth > 0 => depth -= 1,
            c if c.is_alphanumeric() || matches!(c, '_' | '.' | '?' | '!' | '$') => {}
            _ if depth > 0 => {}
            _ => break,
        }
        start = i;
    }
    &prefix[start..]
}

fn is_sdk_receiver(expr: &str, receivers: &[String]) -> bool {
    if expr.to_lowercase().contains("trustarc") {
        return true;
    }
    expr.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .any(|word| receivers.iter().any(|r| r == word))
}

/// First match of `re` on `line` whose receiver is the SDK
fn sdk_call<'l>(re: &Regex, line: &'l str, receivers: &[String]) -> Option<regex::Match<'l>> {
    re.find_iter(line)
        .find(|m| is_sdk_receiver(receiver_before(&line[..m.start()]), receivers))
}

/// Extracts SDK evidence from the head of one source file.
///
/// Returns `None` when the file never mentions the SDK. Calls only count
/// when made on the SDK: the `TrustArc` type or module, a variable bound to
/// a `TrustArc` instance, or a name the SDK import binds.
pub fn extract_source(path: &Path, language: Language, lines: &[String]) -> Option<SourceEvidence> {
    if !lines.iter().any(|l| l.to_lowercase().contains("trustarc")) {
        return None;
    }

    static OPEN: OnceLock<Regex> = OnceLock::new();
    static DEBUG: OnceLock<Regex> = OnceLock::new();
    static LISTENER: OnceLock<Regex> = OnceLock::new();
    let open = regex(&OPEN, r"\.openCM\s*\(");
    let debug = regex(&DEBUG, r"\.enableDebugLog\s*\(");
    let listener = regex(&LISTENER, r"\.addConsentListener\b");

    let patterns = patterns_for(language);
    let receivers = sdk_receivers(language, lines, patterns.import);
    let mut evidence = SourceEvidence::new(path.to_path_buf(), language);
    let cross_platform = matches!(
        language,
        Language::JavaScript | Language::TypeScript | Language::Dart
    );

    for (idx, line) in lines.iter().enumerate() {
        if is_comment(line) {
            continue;
        }
        let trimmed = line.trim_start();
        let line_no = idx as u32 + 1;

        if evidence.import_line.is_none() && patterns.import.is_match(line) {
            evidence.import_line = Some(line_no);
            continue;
        }
        if let Some(construction) = patterns.construction {
            if construction.is_match(line) && !trimmed.starts_with("class ") {
                evidence.constructions.push(CallSite {
                    line: line_no,
                    configured: constructor_configured(line),
                });
            }
        }
        if let Some(m) = sdk_call(patterns.start, line, &receivers) {
            evidence.starts.push(CallSite {
                line: line_no,
                configured: cross_platform || start_configured(line, m.end()),
            });
        }
        if sdk_call(open, line, &receivers).is_some() {
            evidence.opens.push(CallSite { line: line_no, configured: true });
        }
        if sdk_call(debug, line, &receivers).is_some() {
            evidence.debug_logs.push(CallSite { line: line_no, configured: true });
        }
        if sdk_call(listener, line, &receivers).is_some() {
            evidence.listeners.push(CallSite { line: line_no, configured: true });
        }
    }

    Some(evidence)
}
