//! User-level configuration for sdk-doctor
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/sdk-doctor/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the generator command line (program followed by arguments)
pub const GENERATOR_ENV: &str = "SDK_DOCTOR_GENERATOR";
/// Overrides the generator backend
pub const BACKEND_ENV: &str = "SDK_DOCTOR_BACKEND";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub generator: GeneratorSettings,

    #[serde(default)]
    pub qa: QaSettings,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneratorSettings {
    /// Backend: "command" (default), "anthropic", "openai", "ollama"
    pub backend: Option<String>,

    /// External program invoked once per question (prompt on stdin)
    pub command: Option<String>,

    /// Arguments passed to `command`
    #[serde(default)]
    pub args: Vec<String>,

    /// Wall-clock limit per attempt, in seconds (default: 120)
    pub timeout_secs: Option<u64>,

    /// Extra attempts after a failed or timed-out call (default: 1)
    pub retries: Option<u32>,

    /// Model name for HTTP backends
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QaSettings {
    /// Knowledge corpus replacing the bundled one
    pub knowledge_file: Option<PathBuf>,

    /// Maximum lines of a retrieved excerpt (default: 200)
    pub max_lines: Option<usize>,

    /// Lines kept before a keyword hit (default: 3)
    pub context_before: Option<usize>,

    /// Lines kept after a keyword hit (default: 3)
    pub context_after: Option<usize>,

    /// Maximum lines of project excerpt per prompt (default: 120)
    pub context_max_lines: Option<usize>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/sdk-doctor/config.toml)
    pub fn load() -> Result<Self> {
        Self::load_from(Self::user_config_path().as_deref())
    }

    /// Load from an explicit config file, then apply environment overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(user_config) = path
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|content| match toml::from_str::<UserConfig>(&content) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!("Ignoring malformed user config: {}", e);
                    None
                }
            })
        {
            config.merge(user_config);
        }

        // Environment variables override everything
        if let Ok(backend) = std::env::var(BACKEND_ENV) {
            config.generator.backend = Some(backend);
        }
        if let Ok(command_line) = std::env::var(GENERATOR_ENV) {
            config.apply_command_line(&command_line);
        }

        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sdk-doctor").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        let g = other.generator;
        if g.backend.is_some() {
            self.generator.backend = g.backend;
        }
        if g.command.is_some() {
            self.generator.command = g.command;
            self.generator.args = g.args;
        }
        if g.timeout_secs.is_some() {
            self.generator.timeout_secs = g.timeout_secs;
        }
        if g.retries.is_some() {
            self.generator.retries = g.retries;
        }
        if g.model.is_some() {
            self.generator.model = g.model;
        }

        let q = other.qa;
        if q.knowledge_file.is_some() {
            self.qa.knowledge_file = q.knowledge_file;
        }
        if q.max_lines.is_some() {
            self.qa.max_lines = q.max_lines;
        }
        if q.context_before.is_some() {
            self.qa.context_before = q.context_before;
        }
        if q.context_after.is_some() {
            self.qa.context_after = q.context_after;
        }
        if q.context_max_lines.is_some() {
            self.qa.context_max_lines = q.context_max_lines;
        }
    }

    /// Split a whitespace-separated command line into program and arguments
    fn apply_command_line(&mut self, command_line: &str) {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        if let Some(program) = parts.next() {
            self.generator.command = Some(program);
            self.generator.args = parts.collect();
        }
    }

    /// Get the generator backend name
    pub fn generator_backend(&self) -> &str {
        self.generator.backend.as_deref().unwrap_or("command")
    }

    pub fn generator_timeout_secs(&self) -> u64 {
        self.generator.timeout_secs.unwrap_or(120)
    }

    pub fn generator_retries(&self) -> u32 {
        self.generator.retries.unwrap_or(1)
    }

    pub fn max_lines(&self) -> usize {
        self.qa.max_lines.unwrap_or(200)
    }

    pub fn context_before(&self) -> usize {
        self.qa.context_before.unwrap_or(3)
    }

    pub fn context_after(&self) -> usize {
        self.qa.context_after.unwrap_or(3)
    }

    pub fn context_max_lines(&self) -> usize {
        self.qa.context_max_lines.unwrap_or(120)
    }
}
