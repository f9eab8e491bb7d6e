//! Text (terminal) reporter with colors and formatting
//!
//! Findings are grouped successes, errors, warnings, info. Colors come from
//! `console` and follow its global switch, so `--no-color` and non-TTY
//! output print plain text.

use crate::models::{Finding, FindingsSummary, Report, ScoreBand, Severity};
use anyhow::Result;
use console::{style, StyledObject};

fn band_style(band: ScoreBand, text: String) -> StyledObject<String> {
    match band {
        ScoreBand::Excellent => style(text).green().bold(),
        ScoreBand::Good => style(text).green(),
        ScoreBand::Fair => style(text).yellow().bold(),
        ScoreBand::Poor => style(text).red().bold(),
    }
}

fn severity_heading(severity: Severity) -> StyledObject<&'static str> {
    match severity {
        Severity::Success => style("SUCCESSES").green().bold(),
        Severity::Error => style("ERRORS").red().bold(),
        Severity::Warning => style("WARNINGS").yellow().bold(),
        Severity::Info => style("INFO").blue().bold(),
    }
}

fn severity_tag(severity: Severity) -> StyledObject<&'static str> {
    match severity {
        Severity::Success => style("[ok]").green(),
        Severity::Error => style("[E]").red(),
        Severity::Warning => style("[W]").yellow(),
        Severity::Info => style("[i]").blue(),
    }
}

fn format_location(finding: &Finding) -> Option<String> {
    match (&finding.file_path, finding.line_hint) {
        (Some(file), Some(line)) => Some(format!("{file}:{line}")),
        (Some(file), None) => Some(file.clone()),
        _ => None,
    }
}

/// Render report as formatted terminal output
pub fn render(report: &Report) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", style("TrustArc SDK Integration Report").bold()));
    out.push_str(&format!("{}\n", style("──────────────────────────────────────").dim()));
    out.push_str(&format!("Project:  {}\n", report.project_path));
    out.push_str(&format!("Platform: {}\n", style(report.platform).cyan()));
    let band = report.band();
    out.push_str(&format!(
        "Score:    {} ({})\n\n",
        band_style(band, format!("{}/100", report.score)),
        band.label()
    ));

    for severity in [Severity::Success, Severity::Error, Severity::Warning, Severity::Info] {
        let group: Vec<&Finding> = report.findings_with(severity).collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("{} ({})\n", severity_heading(severity), group.len()));
        for finding in group {
            out.push_str(&format!(
                "  {} {}: {}\n",
                severity_tag(severity),
                style(&finding.category).bold(),
                finding.message
            ));
            if let Some(location) = format_location(finding) {
                out.push_str(&format!("      {}\n", style(location).dim()));
            }
            if let Some(suggestion) = &finding.suggestion {
                out.push_str(&format!("      {} {}\n", style("fix:").cyan(), suggestion));
            }
        }
        out.push('\n');
    }

    let s = FindingsSummary::from_findings(&report.findings);
    out.push_str(&format!(
        "{} {} errors, {} warnings, {} info, {} passed\n",
        style("SUMMARY").bold(),
        s.error,
        s.warning,
        s.info,
        s.success
    ));

    if s.error > 0 {
        out.push_str(&format!(
            "\n{}\n",
            style("Fix the errors above first; they carry the largest penalty.").dim()
        ));
    }

    Ok(out)
}
