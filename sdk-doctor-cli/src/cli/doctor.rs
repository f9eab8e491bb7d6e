//! Doctor command - check configuration and generator setup

use anyhow::Result;
use console::style;
use std::path::Path;

use crate::config::{UserConfig, PROJECT_CONFIG_FILE};
use crate::qa::build_generator;

fn ok(label: &str, detail: impl std::fmt::Display) {
    println!("{} {}: {}", style("✓").green(), label, detail);
}

fn missing(label: &str, detail: impl std::fmt::Display) {
    println!("{} {}: {}", style("○").yellow(), label, detail);
}

pub fn run() -> Result<()> {
    println!("{}\n", style("sdk-doctor doctor").bold());

    let config = UserConfig::load()?;
    match UserConfig::user_config_path() {
        Some(path) if path.exists() => ok("User config", path.display()),
        Some(path) => missing("User config", format!("{} (not created, using defaults)", path.display())),
        None => missing("User config", "no config directory on this system"),
    }
    if Path::new(PROJECT_CONFIG_FILE).exists() {
        ok("Project config", PROJECT_CONFIG_FILE);
    } else {
        missing("Project config", format!("no {} in the current directory", PROJECT_CONFIG_FILE));
    }

    match build_generator(&config) {
        Ok(generator) => ok("Generator", generator.describe()),
        Err(e) => missing("Generator", e),
    }

    match super::load_retriever(None, &config) {
        Ok(retriever) => {
            let topics: Vec<_> = retriever
                .corpus()
                .sections()
                .iter()
                .map(|s| s.topic.as_str())
                .collect();
            ok(
                "Knowledge",
                format!("{} sections ({})", topics.len(), topics.join(", ")),
            );
        }
        Err(e) => println!("{} Knowledge: {:#}", style("✗").red(), e),
    }

    Ok(())
}
