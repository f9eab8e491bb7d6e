//! Project scanner
//!
//! Turns a project tree into [`PlatformSignals`]:
//! 1. Walk once (`files`)
//! 2. Read every manifest once, detect the platform (`platform`)
//! 3. Extract structured evidence from the platform's manifests and the
//!    heads of its source files (`signals`)
//!
//! The scanned project is never written to.

pub mod files;
pub mod platform;
pub mod signals;

pub use files::{collect_project_files, read_capped, read_head, Language, ManifestKind, ProjectFiles};
pub use platform::{detect_platform, LoadedManifest};
pub use signals::{
    CallSite, DependencyDecl, ManifestIssue, ManifestRef, MinSdkDecl, PermissionDecl,
    PlatformSignals, ScanStats, SourceEvidence,
};

use crate::config::ScanConfig;
use crate::models::Platform;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Project path does not exist or is not a directory: {0}")]
    InvalidProjectPath(PathBuf),

    #[error("Cannot read project directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validate the root, returning it unchanged on success
pub fn validate_root(root: &Path) -> Result<&Path, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidProjectPath(root.to_path_buf()));
    }
    std::fs::read_dir(root).map_err(|source| ScanError::Walk {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(root)
}

/// Scan a project tree.
///
/// Only an invalid or unreadable root is fatal. Unreadable files are
/// skipped and counted in [`ScanStats`].
pub fn scan(root: &Path, config: &ScanConfig) -> Result<PlatformSignals, ScanError> {
    let root = validate_root(root)?;
    let files = collect_project_files(root, config);

    let mut stats = ScanStats::default();
    let mut loaded = Vec::with_capacity(files.manifests.len());
    for (kind, rel) in &files.manifests {
        match read_capped(&root.join(rel), config.max_manifest_bytes) {
            Ok(content) => loaded.push(LoadedManifest {
                kind: *kind,
                path: rel.clone(),
                content,
            }),
            Err(e) => {
                debug!("Skipping unreadable manifest {}: {}", rel.display(), e);
                stats.unreadable_files += 1;
            }
        }
    }

    let platform = detect_platform(&files, &loaded);
    info!("Detected platform {} for {}", platform, root.display());

    let mut signals = PlatformSignals {
        platform,
        root: root.to_path_buf(),
        manifests: loaded
            .iter()
            .map(|m| ManifestRef {
                kind: m.kind,
                path: m.path.clone(),
            })
            .collect(),
        ..Default::default()
    };

    if platform == Platform::Unknown {
        signals.stats = stats;
        return Ok(signals);
    }

    let kinds = platform::manifest_kinds(platform);
    for manifest in loaded.iter().filter(|m| kinds.contains(&m.kind)) {
        signals::extract_manifest(manifest.kind, &manifest.path, &manifest.content, &mut signals);
    }

    for (language, rel) in files.sources_in(platform::source_languages(platform)) {
        match read_head(&root.join(rel), config.max_head_lines) {
            Ok((lines, truncated)) => {
                stats.source_files += 1;
                if truncated {
                    stats.truncated_files += 1;
                }
                if let Some(evidence) = signals::extract_source(rel, *language, &lines) {
                    signals.sources.push(evidence);
                }
            }
            Err(e) => {
                debug!("Skipping unreadable source {}: {}", rel.display(), e);
                stats.unreadable_files += 1;
            }
        }
    }

    debug!(
        "Scan stats: {} sources ({} truncated, {} unreadable), {} referencing the SDK",
        stats.source_files,
        stats.truncated_files,
        stats.unreadable_files,
        signals.sources.len()
    );
    signals.stats = stats;
    Ok(signals)
}
