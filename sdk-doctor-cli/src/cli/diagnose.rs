//! Diagnose command - scan, score and report

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::config::load_project_config;
use crate::pipeline::Pipeline;
use crate::reporters::{self, OutputFormat};

fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn run(path: &Path, json: bool, output: Option<&Path>, no_color: bool) -> Result<()> {
    if no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let config = load_project_config(path);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style());
    spinner.set_message(format!("Scanning {}...", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = Pipeline::new(&config).run(path);
    spinner.finish_and_clear();
    let (report, stats) =
        result.with_context(|| format!("Failed to diagnose {}", path.display()))?;
    tracing::debug!("{:?}", stats);

    let format = if json { OutputFormat::Json } else { OutputFormat::Text };
    let rendered = reporters::render(&report, format)?;

    match output {
        Some(out_path) => {
            std::fs::write(out_path, &rendered)
                .with_context(|| format!("Failed to write report to {}", out_path.display()))?;
            eprintln!("Report written to: {}", style(out_path.display()).cyan());
        }
        None => println!("{}", rendered),
    }

    if report.score < config.scoring.pass_threshold {
        std::io::stdout().flush().ok();
        std::process::exit(1);
    }
    Ok(())
}
