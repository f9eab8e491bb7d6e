//! sdk-doctor - TrustArc consent SDK integration checks
//!
//! Diagnoses how a mobile project wires in the TrustArc Mobile Consent SDK
//! and answers integration questions.

use anyhow::Result;
use clap::Parser;
use sdk_doctor::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level; logs go to stderr so stdout stays parseable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sdk_doctor={}", cli.log_level)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(cli)
}
