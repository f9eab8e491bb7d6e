//! CLI command definitions and handlers

mod ask;
mod diagnose;
mod doctor;
mod lookup;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::UserConfig;
use crate::knowledge::{KnowledgeCorpus, KnowledgeRetriever, RetrievalLimits};

/// sdk-doctor - TrustArc consent SDK integration checks
///
/// Runs locally; only `ask` talks to a text generator.
#[derive(Parser, Debug)]
#[command(name = "sdk-doctor")]
#[command(
    version,
    about = "Diagnose TrustArc Mobile Consent SDK integrations and answer integration questions",
    long_about = "sdk-doctor scans an Android, iOS, React Native or Flutter project, checks how \
the TrustArc Mobile Consent SDK is wired in, and prints a scored report with fixes.\n\n\
`ask` answers questions from the bundled SDK notes, optionally grounded in your own code.",
    after_help = "\
Examples:
  sdk-doctor diagnose .                        Diagnose the current directory
  sdk-doctor diagnose app --json -o r.json     JSON report for CI
  sdk-doctor ask . --report r.json --context   Ask questions about this project
  sdk-doctor lookup \"android gradle\"           Show the matching SDK notes
  sdk-doctor doctor                            Check generator and config setup"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a project and score its TrustArc SDK integration
    #[command(after_help = "\
Exit codes:
  0  score is at or above the pass threshold (default 70)
  1  score is below the threshold, or the path could not be scanned")]
    Diagnose {
        /// Project root to scan
        path: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Disable coloured output
        #[arg(long)]
        no_color: bool,
    },

    /// Interactive Q&A about SDK integration
    #[command(after_help = "\
In-session commands:
  :context on|off   Include project excerpts in each question
  :rescan           Re-read the project excerpts
  :help             Show these commands
  quit, exit, q     Leave the session (EOF works too)")]
    Ask {
        /// Project root used for `:context` excerpts
        #[arg(default_value = ".")]
        path: PathBuf,

        /// JSON report from `diagnose --json` to ground answers in
        #[arg(long)]
        report: Option<PathBuf>,

        /// Start with project context enabled
        #[arg(long)]
        context: bool,

        /// Knowledge file to use instead of the bundled notes
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },

    /// Print the knowledge excerpt a question would retrieve
    Lookup {
        /// Free-text query
        query: String,

        /// Knowledge file to use instead of the bundled notes
        #[arg(long)]
        knowledge: Option<PathBuf>,
    },

    /// Check configuration, generator and knowledge setup
    Doctor,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Diagnose {
            path,
            json,
            output,
            no_color,
        } => diagnose::run(&path, json, output.as_deref(), no_color),

        Commands::Ask {
            path,
            report,
            context,
            knowledge,
        } => ask::run(&path, report.as_deref(), context, knowledge.as_deref()),

        Commands::Lookup { query, knowledge } => lookup::run(&query, knowledge.as_deref()),

        Commands::Doctor => doctor::run(),
    }
}

/// Corpus from `--knowledge`, then `[qa] knowledge_file`, then the bundled notes
pub(crate) fn load_retriever(flag: Option<&Path>, config: &UserConfig) -> Result<KnowledgeRetriever> {
    let limits = RetrievalLimits {
        max_lines: config.max_lines(),
        context_before: config.context_before(),
        context_after: config.context_after(),
    };
    let corpus = match flag.or(config.qa.knowledge_file.as_deref()) {
        Some(path) => KnowledgeCorpus::load(path)
            .with_context(|| format!("Failed to load knowledge file {}", path.display()))?,
        None => KnowledgeCorpus::bundled(),
    };
    Ok(KnowledgeRetriever::new(Arc::new(corpus), limits))
}
