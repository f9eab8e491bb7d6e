//! Lookup command - show what the retriever returns for a query

use anyhow::{bail, Result};
use console::style;
use std::path::Path;

use crate::config::UserConfig;
use crate::knowledge::RetrievalTier;

pub fn run(query: &str, knowledge: Option<&Path>) -> Result<()> {
    let config = UserConfig::load()?;
    let retriever = super::load_retriever(knowledge, &config)?;
    let retrieval = retriever.retrieve_with_tier(query);

    if retrieval.tier == RetrievalTier::Miss {
        bail!("No knowledge matched '{}' and the corpus has no common section", query);
    }

    eprintln!("{} {}", style("Matched:").dim(), retrieval.tier);
    println!("{}", retrieval.excerpt);
    Ok(())
}
