//! One question in, one answer out.

use super::context::ProjectContext;
use super::generator::Generator;
use super::prompts::PromptBuilder;
use super::QaError;
use crate::knowledge::KnowledgeRetriever;
use crate::models::Report;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_CONTEXT_MAX_LINES: usize = 120;

/// Stateless Q&A: each `ask` builds a fresh prompt from retrieval, the
/// optional report and the optional project context.
pub struct QaSession {
    retriever: KnowledgeRetriever,
    generator: Box<dyn Generator>,
    context_max_lines: usize,
}

impl QaSession {
    pub fn new(retriever: KnowledgeRetriever, generator: Box<dyn Generator>) -> Self {
        Self {
            retriever,
            generator,
            context_max_lines: DEFAULT_CONTEXT_MAX_LINES,
        }
    }

    pub fn with_context_max_lines(mut self, max_lines: usize) -> Self {
        self.context_max_lines = max_lines;
        self
    }

    pub fn retriever(&self) -> &KnowledgeRetriever {
        &self.retriever
    }

    pub fn replace_corpus(&mut self, corpus: Arc<crate::knowledge::KnowledgeCorpus>) {
        self.retriever.replace_corpus(corpus);
    }

    pub fn generator_description(&self) -> String {
        self.generator.describe()
    }

    pub fn ask(
        &self,
        question: &str,
        report: Option<&Report>,
        context: Option<&ProjectContext>,
    ) -> Result<String, QaError> {
        let retrieval = self.retriever.retrieve_with_tier(question);
        let project = context
            .map(|c| c.render(self.context_max_lines))
            .unwrap_or_default();
        debug!(
            "Retrieved {} ({} chars), project excerpt {} chars",
            retrieval.tier,
            retrieval.excerpt.len(),
            project.len()
        );

        if retrieval.excerpt.trim().is_empty() && project.trim().is_empty() {
            return Err(QaError::RetrievalMiss);
        }

        let prompt = PromptBuilder::new()
            .with_report(report)
            .with_knowledge(&retrieval.excerpt)
            .with_project(&project)
            .build(question);

        info!("Asking {}", self.generator.describe());
        Ok(self.generator.generate(&prompt)?)
    }
}
