//! Sectioned documentation corpus.
//!
//! A corpus is plain text split by `=== TOPIC: <name> ===` header lines.
//! Lines before the first header are ignored and body lines are kept
//! verbatim.

use super::KnowledgeError;
use std::path::Path;
use tracing::debug;

/// Corpus compiled into the binary
pub const BUNDLED_CORPUS: &str = include_str!("corpus.txt");

const HEADER_PREFIX: &str = "=== TOPIC:";
const HEADER_SUFFIX: &str = "===";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeSection {
    pub topic: String,
    pub body: String,
}

/// Immutable, ordered sequence of sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeCorpus {
    sections: Vec<KnowledgeSection>,
    /// Every line from the first header on, headers included
    lines: Vec<String>,
}

fn header_topic(line: &str) -> Option<&str> {
    let inner = line
        .trim()
        .strip_prefix(HEADER_PREFIX)?
        .strip_suffix(HEADER_SUFFIX)?
        .trim();
    (!inner.is_empty()).then_some(inner)
}

impl KnowledgeCorpus {
    pub fn parse(text: &str) -> Self {
        let mut corpus = Self::default();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in text.lines() {
            if let Some(topic) = header_topic(line) {
                if let Some((topic, body)) = current.take() {
                    corpus.push_section(topic, body);
                }
                current = Some((topic.to_string(), Vec::new()));
                corpus.lines.push(line.to_string());
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line);
                corpus.lines.push(line.to_string());
            }
        }
        if let Some((topic, body)) = current {
            corpus.push_section(topic, body);
        }
        corpus
    }

    fn push_section(&mut self, topic: String, mut body: Vec<&str>) {
        while body.last().is_some_and(|l| l.trim().is_empty()) {
            body.pop();
        }
        self.sections.push(KnowledgeSection {
            topic,
            body: body.join("\n"),
        });
    }

    pub fn bundled() -> Self {
        Self::parse(BUNDLED_CORPUS)
    }

    /// Load an external corpus file
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let text = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::parse(&text);
        if corpus.is_empty() {
            return Err(KnowledgeError::Empty(path.to_path_buf()));
        }
        debug!("Loaded {} knowledge sections from {}", corpus.len(), path.display());
        Ok(corpus)
    }

    /// Section by topic name, case-insensitive
    pub fn section(&self, topic: &str) -> Option<&KnowledgeSection> {
        self.sections
            .iter()
            .find(|s| s.topic.eq_ignore_ascii_case(topic))
    }

    pub fn sections(&self) -> &[KnowledgeSection] {
        &self.sections
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let corpus = KnowledgeCorpus::parse(
            "preamble\n=== TOPIC: one ===\nalpha\n  beta\n\n\n=== TOPIC: two ===\ngamma\n",
        );
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.sections()[0].topic, "one");
        assert_eq!(corpus.sections()[0].body, "alpha\n  beta");
        assert_eq!(corpus.section("TWO").unwrap().body, "gamma");
        assert_eq!(corpus.lines()[0], "=== TOPIC: one ===");
        assert!(!corpus.lines().iter().any(|l| l == "preamble"));
    }

    #[test]
    fn test_text_without_headers_is_empty() {
        assert!(KnowledgeCorpus::parse("just some notes\n").is_empty());
    }

    #[test]
    fn test_bundled_corpus_has_core_topics() {
        let corpus = KnowledgeCorpus::bundled();
        for topic in [
            "android",
            "ios",
            "react-native",
            "flutter",
            "common",
            "initialization",
            "consent-dialog",
            "data-retrieval",
            "webview",
            "listeners",
            "errors",
        ] {
            assert!(corpus.section(topic).is_some(), "missing {topic}");
        }
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            KnowledgeCorpus::load(&missing),
            Err(KnowledgeError::Read { .. })
        ));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "no headers here").unwrap();
        assert!(matches!(
            KnowledgeCorpus::load(&empty),
            Err(KnowledgeError::Empty(_))
        ));
    }
}
