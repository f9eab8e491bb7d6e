//! Core data models for sdk-doctor
//!
//! These models are shared by the scanner, the rule engine, the reporters
//! and the Q&A session.

use crate::scoring::Scorer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mobile platform detected for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Platform {
    #[serde(rename = "ios")]
    Ios,
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "react-native")]
    ReactNative,
    #[serde(rename = "flutter")]
    Flutter,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::ReactNative => "react-native",
            Platform::Flutter => "flutter",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity levels for findings
///
/// Ordered so that `Error` compares greatest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
        }
    }
}

/// A single detected condition, either a problem or a confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: String,
    pub severity: Severity,
    pub message: String,
    #[serde(rename = "file", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(rename = "line", default, skip_serializing_if = "Option::is_none")]
    pub line_hint: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            severity,
            message: message.into(),
            file_path: None,
            line_hint: None,
            suggestion: None,
        }
    }

    pub fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    pub fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    pub fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    pub fn success(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, category, message)
    }

    pub fn in_file(mut self, path: &Path) -> Self {
        self.file_path = Some(path.display().to_string());
        self
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line_hint = Some(line);
        self
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub success: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::Error => summary.error += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
                Severity::Success => summary.success += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Interpretation band for a score (display only, never stored)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ScoreBand::Excellent,
            70..=89 => ScoreBand::Good,
            50..=69 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
        }
    }
}

/// Result of one diagnostic scan
///
/// Built once per scan and never mutated; a rescan produces a new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub platform: Platform,
    pub project_path: String,
    pub score: u8,
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub summary: FindingsSummary,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Aggregate findings into a report, scoring them with `scorer`
    pub fn build(platform: Platform, project_path: &Path, findings: Vec<Finding>, scorer: &Scorer) -> Self {
        Self {
            platform,
            project_path: project_path.display().to_string(),
            score: scorer.score(&findings),
            summary: FindingsSummary::from_findings(&findings),
            findings,
            generated_at: Utc::now(),
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    pub fn findings_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// Load a report previously written with `--json`
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
