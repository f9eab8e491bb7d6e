//! Configuration module for sdk-doctor
//!
//! This module handles:
//! - Project-level configuration (sdk-doctor.toml): scan limits, scoring
//! - User-level configuration (~/.config/sdk-doctor/config.toml): generator, Q&A

mod project_config;
mod user_config;

pub use project_config::{
    load_project_config, ProjectConfig, ScanConfig, ScoringConfig, PROJECT_CONFIG_FILE,
};
pub use user_config::{GeneratorSettings, QaSettings, UserConfig, BACKEND_ENV, GENERATOR_ENV};
