//! Grounded Q&A over the knowledge corpus and the scanned project
//!
//! Each question is answered in one stateless turn: retrieve a documentation
//! excerpt, optionally add a project excerpt, then hand the [`Prompt`] to a
//! [`Generator`]. Generators are either an external command (the whole prompt
//! on stdin) or an HTTP LLM backend (system instructions in the API's system
//! slot).
//!
//! # Environment Variables
//!
//! - `SDK_DOCTOR_GENERATOR`: command line of the external generator
//! - `SDK_DOCTOR_BACKEND`: `command`, `anthropic`, `openai` or `ollama`
//! - `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`: keys for the HTTP backends
//! - `OLLAMA_MODEL`: model for the local Ollama backend

mod client;
mod context;
mod generator;
mod prompts;
mod session;

pub use client::{AiClient, AiConfig, LlmBackend};
pub use context::{ContextLimits, ProjectContext};
pub use generator::{build_generator, CommandGenerator, Generator};
pub use prompts::{Prompt, PromptBuilder, SYSTEM_INSTRUCTIONS};
pub use session::QaSession;

use thiserror::Error;

/// Errors raised by a generator backend
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("No generator configured: {0}")]
    NotConfigured(String),

    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("Failed to start generator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator timed out after {0}s")]
    Timeout(u64),

    #[error("Generator failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

/// Errors from one Q&A turn
#[derive(Error, Debug)]
pub enum QaError {
    #[error("No documentation or project excerpt matched the question; try naming the platform or SDK call")]
    RetrievalMiss,

    #[error("Text generator unavailable: {0}")]
    GeneratorUnavailable(#[from] GeneratorError),
}
