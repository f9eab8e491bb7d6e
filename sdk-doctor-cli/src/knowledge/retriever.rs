//! Three-tier excerpt retrieval over a [`KnowledgeCorpus`].
//!
//! 1. Topic routing: platform keywords, then feature keywords, select a
//!    whole section.
//! 2. Keyword windows: substring hits on the raw query, with context lines.
//! 3. Fallback: the `common` section.
//!
//! The first tier that yields text wins.

use super::corpus::KnowledgeCorpus;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Section returned when nothing else matches
pub const FALLBACK_TOPIC: &str = "common";

/// Keyword groups in routing order: (section topic, keywords)
const ROUTES: &[(&str, &[&str])] = &[
    (
        "react-native",
        &["react native", "react-native", "rn", "expo", "npm", "yarn", "javascript", "typescript"],
    ),
    ("flutter", &["flutter", "dart", "pubspec"]),
    (
        "ios",
        &["ios", "swift", "xcode", "cocoapods", "podfile", "spm", "iphone", "ipad", "objective-c"],
    ),
    ("android", &["android", "kotlin", "java", "gradle", "manifest", "apk"]),
    (
        "consent-dialog",
        &["dialog", "dialogs", "show", "shows", "showing", "shown", "display", "displayed", "displaying", "opencm", "banner", "popup"],
    ),
    (
        "listeners",
        &["listener", "listeners", "listen", "listening", "callback", "callbacks", "event", "events", "changes", "changed"],
    ),
    ("webview", &["webview", "webviews", "web view", "inject", "injection", "injecting"]),
    (
        "initialization",
        &["initialize", "initialise", "initialization", "initializing", "init", "setup", "set up"],
    ),
    ("data-retrieval", &["get", "retrieve", "retrieving", "read", "tcf", "stored"]),
    (
        "errors",
        &["error", "errors", "crash", "crashes", "crashing", "fail", "fails", "failed", "failing", "exception"],
    ),
];

#[derive(Debug, Clone, Copy)]
pub struct RetrievalLimits {
    pub max_lines: usize,
    pub context_before: usize,
    pub context_after: usize,
}

impl Default for RetrievalLimits {
    fn default() -> Self {
        Self {
            max_lines: 200,
            context_before: 3,
            context_after: 3,
        }
    }
}

/// Which tier produced an excerpt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalTier {
    Topic(String),
    Keyword,
    Fallback,
    Miss,
}

impl fmt::Display for RetrievalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalTier::Topic(topic) => write!(f, "topic ({topic})"),
            RetrievalTier::Keyword => write!(f, "keyword search"),
            RetrievalTier::Fallback => write!(f, "fallback ({FALLBACK_TOPIC})"),
            RetrievalTier::Miss => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieval {
    pub tier: RetrievalTier,
    pub excerpt: String,
}

pub struct KnowledgeRetriever {
    corpus: Arc<KnowledgeCorpus>,
    limits: RetrievalLimits,
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|w| w == phrase)
}

fn truncate_lines<'a>(lines: impl Iterator<Item = &'a str>, max_lines: usize) -> String {
    lines.take(max_lines).collect::<Vec<_>>().join("\n")
}

impl KnowledgeRetriever {
    pub fn new(corpus: Arc<KnowledgeCorpus>, limits: RetrievalLimits) -> Self {
        Self { corpus, limits }
    }

    pub fn bundled() -> Self {
        Self::new(Arc::new(KnowledgeCorpus::bundled()), RetrievalLimits::default())
    }

    pub fn corpus(&self) -> &KnowledgeCorpus {
        &self.corpus
    }

    /// Swap the whole corpus; excerpts already returned are unaffected
    pub fn replace_corpus(&mut self, corpus: Arc<KnowledgeCorpus>) {
        debug!("Replacing knowledge corpus ({} sections)", corpus.len());
        self.corpus = corpus;
    }

    /// Best excerpt for `query`, or an empty string
    pub fn retrieve(&self, query: &str) -> String {
        self.retrieve_with_tier(query).excerpt
    }

    pub fn retrieve_with_tier(&self, query: &str) -> Retrieval {
        let query = query.trim();
        if !query.is_empty() {
            if let Some(retrieval) = self.by_topic(query) {
                return retrieval;
            }
            let excerpt = self.by_keyword(query);
            if !excerpt.is_empty() {
                return Retrieval {
                    tier: RetrievalTier::Keyword,
                    excerpt,
                };
            }
        }
        self.fallback()
    }

    fn section_excerpt(&self, topic: &str) -> Option<String> {
        self.corpus
            .section(topic)
            .map(|s| truncate_lines(s.body.lines(), self.limits.max_lines))
            .filter(|e| !e.is_empty())
    }

    fn by_topic(&self, query: &str) -> Option<Retrieval> {
        let tokens = tokenize(query);
        for (topic, keywords) in ROUTES {
            let matched = keywords
                .iter()
                .any(|k| contains_phrase(&tokens, &tokenize(k)));
            if !matched {
                continue;
            }
            debug!("Query routed to topic {}", topic);
            // First matching group decides, even if its section is missing
            return self.section_excerpt(topic).map(|excerpt| Retrieval {
                tier: RetrievalTier::Topic(topic.to_string()),
                excerpt,
            });
        }
        None
    }

    fn by_keyword(&self, query: &str) -> String {
        let needle = query.to_lowercase();
        let lines = self.corpus.lines();

        let mut windows: Vec<(usize, usize)> = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if !line.to_lowercase().contains(&needle) {
                continue;
            }
            let start = idx.saturating_sub(self.limits.context_before);
            let end = (idx + self.limits.context_after).min(lines.len() - 1);
            match windows.last_mut() {
                Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
                _ => windows.push((start, end)),
            }
        }

        let mut out: Vec<&str> = Vec::new();
        for (i, (start, end)) in windows.iter().enumerate() {
            if i > 0 {
                out.push("...");
            }
            out.extend(lines[*start..=*end].iter().map(String::as_str));
        }
        truncate_lines(out.into_iter(), self.limits.max_lines)
    }

    fn fallback(&self) -> Retrieval {
        match self.section_excerpt(FALLBACK_TOPIC) {
            Some(excerpt) => Retrieval {
                tier: RetrievalTier::Fallback,
                excerpt,
            },
            None => Retrieval {
                tier: RetrievalTier::Miss,
                excerpt: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retriever(text: &str) -> KnowledgeRetriever {
        KnowledgeRetriever::new(
            Arc::new(KnowledgeCorpus::parse(text)),
            RetrievalLimits::default(),
        )
    }

    const SMALL: &str = "=== TOPIC: android ===\nandroid body\nuse gradle\n\
=== TOPIC: ios ===\nios body\n\
=== TOPIC: common ===\ncommon ops\n\
=== TOPIC: notes ===\nl1\nl2\nl3\nl4 webview\nl5\nl6\nl7\nl8\nl9\nl10\nl11 webview\nl12\n";

    #[test]
    fn test_android_gradle_returns_android_section_verbatim() {
        let r = KnowledgeRetriever::bundled();
        let got = r.retrieve_with_tier("android gradle");
        assert_eq!(got.tier, RetrievalTier::Topic("android".to_string()));
        assert_eq!(got.excerpt, r.corpus().section("android").unwrap().body);
    }

    #[test]
    fn test_routing_order_prefers_react_native() {
        let r = KnowledgeRetriever::bundled();
        let got = r.retrieve_with_tier("react-native build fails on android");
        assert_eq!(got.tier, RetrievalTier::Topic("react-native".to_string()));
    }

    #[test]
    fn test_feature_questions_route_to_their_sections() {
        let r = KnowledgeRetriever::bundled();
        for (question, topic) in [
            ("Why is my consent dialog not showing?", "consent-dialog"),
            ("How do I listen for consent changes?", "listeners"),
            ("How do I integrate consent with WebView?", "webview"),
            ("How do I initialize the SDK?", "initialization"),
            ("How do I get the TCF string?", "data-retrieval"),
            ("The app crashes with an error on launch", "errors"),
        ] {
            let got = r.retrieve_with_tier(question);
            assert_eq!(got.tier, RetrievalTier::Topic(topic.to_string()), "{question}");
            assert_eq!(got.excerpt, r.corpus().section(topic).unwrap().body, "{question}");
        }
    }

    #[test]
    fn test_platform_words_outrank_feature_words() {
        let r = KnowledgeRetriever::bundled();
        let got = r.retrieve_with_tier("dialog not showing on iOS");
        assert_eq!(got.tier, RetrievalTier::Topic("ios".to_string()));
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        let r = retriever(SMALL);
        // "return" contains "rn", "javadoc" contains "java"
        let got = r.retrieve_with_tier("return javadoc");
        assert_eq!(got.tier, RetrievalTier::Fallback);
    }

    #[test]
    fn test_objective_c_phrase() {
        let r = retriever(SMALL);
        assert_eq!(r.retrieve("objective-c bridging"), "ios body");
    }

    #[test]
    fn test_keyword_windows_merge_and_separate() {
        let r = KnowledgeRetriever::new(
            Arc::new(KnowledgeCorpus::parse(SMALL)),
            RetrievalLimits {
                max_lines: 200,
                context_before: 1,
                context_after: 1,
            },
        );
        let got = r.retrieve_with_tier("WebView");
        assert_eq!(got.tier, RetrievalTier::Keyword);
        assert_eq!(got.excerpt, "l3\nl4 webview\nl5\n...\nl10\nl11 webview\nl12");
    }

    #[test]
    fn test_overlapping_windows_merge() {
        let r = retriever("=== TOPIC: x ===\na hit\nb\nc hit\nd\n");
        let got = r.retrieve("hit");
        assert_eq!(got, "=== TOPIC: x ===\na hit\nb\nc hit\nd");
    }

    #[test]
    fn test_nonsense_query_returns_common_section() {
        let r = KnowledgeRetriever::bundled();
        let got = r.retrieve_with_tier("zzqx flibbertigibbet");
        assert_eq!(got.tier, RetrievalTier::Fallback);
        assert_eq!(got.excerpt, r.corpus().section("common").unwrap().body);
    }

    #[test]
    fn test_empty_query_and_empty_corpus() {
        assert_eq!(retriever(SMALL).retrieve("   "), "common ops");
        let empty = retriever("");
        assert_eq!(empty.retrieve_with_tier("android").tier, RetrievalTier::Miss);
        assert_eq!(empty.retrieve("anything"), "");
    }

    #[test]
    fn test_max_lines_truncates() {
        let r = KnowledgeRetriever::new(
            Arc::new(KnowledgeCorpus::parse(SMALL)),
            RetrievalLimits {
                max_lines: 1,
                ..Default::default()
            },
        );
        assert_eq!(r.retrieve("android"), "android body");
    }

    #[test]
    fn test_replace_corpus() {
        let mut r = retriever(SMALL);
        r.replace_corpus(Arc::new(KnowledgeCorpus::parse(
            "=== TOPIC: common ===\nreplaced\n",
        )));
        assert_eq!(r.retrieve("nothing matches"), "replaced");
    }
}
