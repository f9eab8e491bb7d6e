//! Output reporters for diagnostic reports
//!
//! Supports two output formats:
//! - `text` - Terminal output grouped by severity, with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::models::Report;
use anyhow::Result;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render a report in the given format
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small Android report with one finding of every severity
    pub(crate) fn test_report() -> Report {
        use crate::models::{Finding, Platform};
        use crate::scoring::Scorer;
        use std::path::Path;

        let findings = vec![
            Finding::success("Dependency", "TrustArc SDK found in Gradle (version 2025.01.1)")
                .in_file(Path::new("app/build.gradle"))
                .at_line(14),
            Finding::error("Permissions", "Missing required permission: INTERNET")
                .suggest("Add: <uses-permission android:name=\"android.permission.INTERNET\" />"),
            Finding::warning("Initialization", "start() called without a domain")
                .in_file(Path::new("app/src/main/java/App.kt"))
                .at_line(22),
            Finding::info("Configuration", "Consider enabling debug logging for development"),
        ];
        Report::build(Platform::Android, Path::new("/work/app"), findings, &Scorer::default())
    }

    #[test]
    fn test_render_dispatch() {
        let r = test_report();
        assert!(render(&r, OutputFormat::Json).unwrap().starts_with('{'));
        assert!(render(&r, OutputFormat::Text)
            .unwrap()
            .contains("Missing required permission"));
    }
}
