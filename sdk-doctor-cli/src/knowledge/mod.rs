//! Documentation retrieval for the Q&A session

pub mod corpus;
pub mod retriever;

pub use corpus::{KnowledgeCorpus, KnowledgeSection, BUNDLED_CORPUS};
pub use retriever::{KnowledgeRetriever, Retrieval, RetrievalLimits, RetrievalTier};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Cannot read knowledge file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Knowledge file {0} has no `=== TOPIC: <name> ===` sections")]
    Empty(PathBuf),
}
