//! Checks shared by more than one platform table.

use super::version::SdkVersion;
use crate::models::{Finding, Severity};
use crate::scanner::{DependencyDecl, Language, ManifestKind, PlatformSignals, SourceEvidence};
use crate::scoring::DEPENDENCY_CATEGORY;

pub const IMPLEMENTATION: &str = "Implementation";
pub const INITIALIZATION: &str = "Initialization";
pub const CONFIGURATION: &str = "Configuration";

/// A manifest entry the SDK needs, e.g. an Android permission
pub struct Requirement {
    pub name: &'static str,
    pub severity_when_missing: Severity,
    pub message: &'static str,
    pub suggestion: &'static str,
}

/// Evaluate a requirement table against a presence predicate
pub fn check_requirements(
    table: &[Requirement],
    category: &str,
    present: impl Fn(&str) -> bool,
) -> Vec<Finding> {
    table
        .iter()
        .filter(|req| !present(req.name))
        .map(|req| {
            Finding::new(req.severity_when_missing, category, req.message).suggest(req.suggestion)
        })
        .collect()
}

/// Success for the first declaration (with version when parseable), plus an
/// info when the version could not be read.
pub fn dependency_found(decl: &DependencyDecl, found_in: &str) -> Vec<Finding> {
    let located = |f: Finding| f.in_file(&decl.path).at_line(decl.line);

    match decl.version.as_deref().map(SdkVersion::parse) {
        Some(Ok(version)) => vec![located(Finding::success(
            DEPENDENCY_CATEGORY,
            format!("TrustArc SDK found in {found_in} (version {version})"),
        ))],
        Some(Err(e)) => vec![
            located(Finding::success(
                DEPENDENCY_CATEGORY,
                format!("TrustArc SDK found in {found_in}"),
            )),
            located(Finding::info(
                DEPENDENCY_CATEGORY,
                format!("Could not determine the SDK version: {e}"),
            ))
            .suggest("Pin an explicit x.y.z version so upgrades are deliberate"),
        ],
        None => vec![
            located(Finding::success(
                DEPENDENCY_CATEGORY,
                format!("TrustArc SDK found in {found_in}"),
            )),
            located(Finding::info(
                DEPENDENCY_CATEGORY,
                "No version specified for the TrustArc SDK dependency",
            ))
            .suggest("Pin an explicit x.y.z version so upgrades are deliberate"),
        ],
    }
}

/// First SDK declaration among `kinds`, in the given priority order
pub fn first_dependency<'a>(
    signals: &'a PlatformSignals,
    kinds: &[ManifestKind],
) -> Option<&'a DependencyDecl> {
    kinds
        .iter()
        .find_map(|kind| signals.dependencies.iter().find(|d| d.manifest == *kind))
}

/// Findings for a manifest that exists but failed to parse
pub fn manifest_issues(signals: &PlatformSignals, kind: ManifestKind) -> Vec<Finding> {
    signals
        .manifest_issues
        .iter()
        .filter(|issue| {
            issue.path.file_name().and_then(|n| n.to_str()) == Some(kind.display_name())
        })
        .map(|issue| Finding::error(CONFIGURATION, issue.message.clone()).in_file(&issue.path))
        .collect()
}

pub fn start_suggestion(language: Language) -> &'static str {
    match language {
        Language::Kotlin => "Call trustArc.start(domainName = \"your.domain\")",
        Language::Java => "Call trustArc.start(\"your.domain\")",
        Language::Swift => "Call trustArc.start(domainName: \"your.domain\")",
        Language::ObjectiveC => "Call [trustArc startWithDomainName:@\"your.domain\"]",
        Language::JavaScript | Language::TypeScript => {
            "Call await TrustArc.initialize({ domain: 'your.domain' }) before using the SDK"
        }
        Language::Dart => {
            "Call await TrustArc.initialize(domain: 'your.domain') before using the SDK"
        }
    }
}

fn constructor_suggestion(language: Language) -> &'static str {
    match language {
        Language::Kotlin => "Pass a mode: TrustArc(context, SdkMode.Standard)",
        Language::Java => "Pass a mode: new TrustArc(context, SdkMode.Standard)",
        _ => "Pass a mode: TrustArc(context: context, mode: .standard)",
    }
}

/// SDK imported somewhere, or an error naming the languages searched
pub fn import(signals: &PlatformSignals, languages: &str) -> Vec<Finding> {
    let importers: Vec<&SourceEvidence> = signals
        .sources
        .iter()
        .filter(|s| s.import_line.is_some())
        .collect();

    match importers.first() {
        None => vec![Finding::error(
            IMPLEMENTATION,
            format!("No TrustArc SDK usage found in {languages} files"),
        )
        .suggest("Import and initialize the TrustArc SDK")],
        Some(first) => vec![Finding::success(
            IMPLEMENTATION,
            format!("TrustArc SDK imported in {} file(s)", importers.len()),
        )
        .in_file(&first.path)
        .at_line(first.import_line.unwrap_or(1))],
    }
}

/// Constructions missing a mode argument, or an import never constructed
pub fn instantiation(signals: &PlatformSignals) -> Vec<Finding> {
    if !signals.has_construction() {
        if signals.has_import() && !signals.has_start() {
            return vec![Finding::warning(
                IMPLEMENTATION,
                "TrustArc SDK imported but never instantiated",
            )
            .suggest("Create the TrustArc instance once, e.g. in Application.onCreate / AppDelegate")];
        }
        return Vec::new();
    }

    let mut findings = Vec::new();
    for source in &signals.sources {
        for site in source.constructions.iter().filter(|c| !c.configured) {
            findings.push(
                Finding::warning(IMPLEMENTATION, "TrustArc constructed without an SdkMode argument")
                    .in_file(&source.path)
                    .at_line(site.line)
                    .suggest(constructor_suggestion(source.language)),
            );
        }
    }
    findings
}

/// A construction with no `start(` anywhere in the scanned sources
pub fn start_called(signals: &PlatformSignals) -> Vec<Finding> {
    if !signals.has_construction() || signals.has_start() {
        return Vec::new();
    }
    let Some(source) = signals.sources.iter().find(|s| !s.constructions.is_empty()) else {
        return Vec::new();
    };
    vec![Finding::error(
        INITIALIZATION,
        "TrustArc instance created but start() never called",
    )
    .in_file(&source.path)
    .at_line(source.first_construction().unwrap_or(1))
    .suggest(start_suggestion(source.language))]
}

/// SDK imported in JS/Dart but `initialize(`/`start(` never called
pub fn initialize_called(signals: &PlatformSignals) -> Vec<Finding> {
    if !signals.has_import() || signals.has_start() {
        return Vec::new();
    }
    let Some(source) = signals.sources.iter().find(|s| s.import_line.is_some()) else {
        return Vec::new();
    };
    vec![Finding::error(
        INITIALIZATION,
        "TrustArc SDK imported but initialize() never called",
    )
    .in_file(&source.path)
    .suggest(start_suggestion(source.language))]
}

/// Per-file ordering of construction, start and openCM
pub fn init_order(signals: &PlatformSignals) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut checked = false;

    for source in &signals.sources {
        let Some(start) = source.first_start() else {
            continue;
        };
        checked = true;

        if let Some(construction) = source.first_construction() {
            if start < construction {
                findings.push(
                    Finding::error(INITIALIZATION, "start() called before TrustArc constructor")
                        .in_file(&source.path)
                        .at_line(start)
                        .suggest("Ensure the TrustArc instance is created before calling start()"),
                );
            }
        }

        if let Some(open) = source.first_open() {
            if open < start {
                findings.push(
                    Finding::error(INITIALIZATION, "openCM() called before start()")
                        .in_file(&source.path)
                        .at_line(open)
                        .suggest("Open the consent manager only after start() has been called"),
                );
            }
        }
    }

    if checked && findings.is_empty() {
        findings.push(Finding::success(INITIALIZATION, "Initialization order looks correct"));
    }
    findings
}

/// `start()` calls with no domain argument
pub fn start_domain(signals: &PlatformSignals) -> Vec<Finding> {
    let mut findings = Vec::new();
    for source in &signals.sources {
        for site in source.starts.iter().filter(|s| !s.configured) {
            findings.push(
                Finding::warning(INITIALIZATION, "start() called without a domain")
                    .in_file(&source.path)
                    .at_line(site.line)
                    .suggest(start_suggestion(source.language)),
            );
        }
    }
    findings
}

pub fn debug_log(signals: &PlatformSignals) -> Vec<Finding> {
    let enabled = signals.sources.iter().any(|s| !s.debug_logs.is_empty());
    match signals.sources.iter().find(|s| !s.starts.is_empty()) {
        Some(source) if !enabled => vec![Finding::info(
            CONFIGURATION,
            "Consider enabling debug logging for development",
        )
        .in_file(&source.path)
        .suggest("Add: trustArc.enableDebugLog(true)")],
        _ => Vec::new(),
    }
}

/// Warning when no source file of the platform mentions the SDK
pub fn usage(signals: &PlatformSignals, where_: &str) -> Vec<Finding> {
    if !signals.sources.is_empty() {
        return Vec::new();
    }
    vec![Finding::warning(
        IMPLEMENTATION,
        format!("No TrustArc SDK usage found in {where_}"),
    )
    .suggest("Import and use the TrustArc SDK in your code")]
}
