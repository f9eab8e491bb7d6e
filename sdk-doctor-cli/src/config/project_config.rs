//! Project-level configuration support
//!
//! Loads per-project configuration from `sdk-doctor.toml` or
//! `.sdk-doctor.json` in the scanned project root.
//!
//! # Configuration Format
//!
//! ```toml
//! # sdk-doctor.toml
//!
//! [scan]
//! max_head_lines = 100
//! exclude = ["generated", "third_party"]
//!
//! [scoring]
//! baseline = 70
//! dependency_bonus = 30
//! error_penalty = 20
//! warning_penalty = 10
//! pass_threshold = 70
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const PROJECT_CONFIG_FILE: &str = "sdk-doctor.toml";
const PROJECT_CONFIG_JSON: &str = ".sdk-doctor.json";

/// Project-level configuration loaded from sdk-doctor.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// File-tree scanning limits and exclusions
    #[serde(default)]
    pub scan: ScanConfig,

    /// Score magnitudes and CI threshold
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Scanner limits
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Lines kept from the head of each source file (default: 100)
    #[serde(default = "default_max_head_lines")]
    pub max_head_lines: usize,

    /// Byte cap for manifest files (default: 256 KiB)
    #[serde(default = "default_max_manifest_bytes")]
    pub max_manifest_bytes: u64,

    /// Extra directory names skipped in addition to the built-in denylist
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_head_lines: default_max_head_lines(),
            max_manifest_bytes: default_max_manifest_bytes(),
            exclude: Vec::new(),
        }
    }
}

fn default_max_head_lines() -> usize {
    100
}

fn default_max_manifest_bytes() -> u64 {
    256 * 1024
}

/// Scoring configuration for the integration score
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Starting score before bonuses and penalties (default: 70)
    #[serde(default = "default_baseline")]
    pub baseline: u32,

    /// Added once when the SDK dependency is confirmed (default: 30)
    #[serde(default = "default_dependency_bonus")]
    pub dependency_bonus: u32,

    /// Subtracted per error finding (default: 20)
    #[serde(default = "default_error_penalty")]
    pub error_penalty: u32,

    /// Subtracted per warning finding (default: 10)
    #[serde(default = "default_warning_penalty")]
    pub warning_penalty: u32,

    /// Minimum score for a zero exit code (default: 70)
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            dependency_bonus: default_dependency_bonus(),
            error_penalty: default_error_penalty(),
            warning_penalty: default_warning_penalty(),
            pass_threshold: default_pass_threshold(),
        }
    }
}

fn default_baseline() -> u32 {
    70
}
fn default_dependency_bonus() -> u32 {
    30
}
fn default_error_penalty() -> u32 {
    20
}
fn default_warning_penalty() -> u32 {
    10
}
fn default_pass_threshold() -> u8 {
    70
}

/// Load project configuration from the project root.
///
/// Searches for configuration files in this order:
/// 1. `sdk-doctor.toml`
/// 2. `.sdk-doctor.json`
///
/// Returns default configuration if no config file is found or it fails to
/// parse. The scanned project is never written to.
pub fn load_project_config(project_path: &Path) -> ProjectConfig {
    let toml_path = project_path.join(PROJECT_CONFIG_FILE);
    if toml_path.is_file() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = project_path.join(PROJECT_CONFIG_JSON);
    if json_path.is_file() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
