//! Prompt assembly for one Q&A turn.

use crate::models::{Report, Severity};

/// Assistant role and the three core SDK operations
pub const SYSTEM_INSTRUCTIONS: &str = include_str!("prompts/system.txt");

/// One Q&A turn: fixed assistant instructions plus the grounded question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

impl Prompt {
    /// Instructions and question as one block, for generators without a
    /// separate system channel
    pub fn to_text(&self) -> String {
        if self.system.is_empty() {
            return self.user.clone();
        }
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Builds a single-turn prompt; no earlier turn is ever included
#[derive(Debug, Default)]
pub struct PromptBuilder<'a> {
    report: Option<&'a Report>,
    knowledge: Option<&'a str>,
    project: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(mut self, report: Option<&'a Report>) -> Self {
        self.report = report;
        self
    }

    pub fn with_knowledge(mut self, excerpt: &'a str) -> Self {
        self.knowledge = (!excerpt.trim().is_empty()).then_some(excerpt);
        self
    }

    pub fn with_project(mut self, excerpt: &'a str) -> Self {
        self.project = (!excerpt.trim().is_empty()).then_some(excerpt);
        self
    }

    pub fn build(&self, question: &str) -> Prompt {
        let mut prompt = String::new();

        if let Some(report) = self.report {
            prompt.push_str(&format!("Detected platform: {}\n", report.platform));
            prompt.push_str(&format!("Integration score: {}/100\n", report.score));
            let errors: Vec<_> = report.findings_with(Severity::Error).collect();
            if !errors.is_empty() {
                prompt.push_str("Open errors from the last diagnostic:\n");
                for f in errors {
                    prompt.push_str(&format!("- [{}] {}\n", f.category, f.message));
                }
            }
            prompt.push('\n');
        }

        if let Some(knowledge) = self.knowledge {
            prompt.push_str("## Documentation\n");
            prompt.push_str(knowledge);
            prompt.push_str("\n\n");
        }

        if let Some(project) = self.project {
            prompt.push_str("## Project excerpt\n");
            prompt.push_str(project);
            prompt.push_str("\n\n");
        }

        prompt.push_str("## Question\n");
        prompt.push_str(question);
        prompt.push('\n');
        Prompt {
            system: SYSTEM_INSTRUCTIONS.trim_end(),
            user: prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finding, Platform};
    use crate::scoring::Scorer;
    use std::path::Path;

    #[test]
    fn test_system_instructions_name_core_operations() {
        for op in ["start(domain)", "openCM()", "getStoredConsentData()"] {
            assert!(SYSTEM_INSTRUCTIONS.contains(op), "{op}");
        }
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let report = Report::build(
            Platform::Ios,
            Path::new("/p"),
            vec![Finding::error("Dependency", "TrustArc SDK dependency not found")],
            &Scorer::default(),
        );
        let prompt = PromptBuilder::new()
            .with_report(Some(&report))
            .with_knowledge("KNOWLEDGE")
            .with_project("PROJECT")
            .build("Why does openCM crash?")
            .to_text();

        let platform = prompt.find("Detected platform: ios").unwrap();
        let error = prompt.find("- [Dependency] TrustArc SDK dependency not found").unwrap();
        let knowledge = prompt.find("KNOWLEDGE").unwrap();
        let project = prompt.find("PROJECT").unwrap();
        let question = prompt.find("Why does openCM crash?").unwrap();
        assert!(platform < error && error < knowledge && knowledge < project && project < question);
    }

    #[test]
    fn test_empty_excerpts_are_omitted() {
        let prompt = PromptBuilder::new()
            .with_knowledge("   ")
            .with_project("")
            .build("q");
        assert_eq!(prompt.user, "## Question\nq\n");
    }

    #[test]
    fn test_instructions_stay_out_of_the_user_turn() {
        let prompt = PromptBuilder::new().with_knowledge("KNOWLEDGE").build("q");
        assert_eq!(prompt.system, SYSTEM_INSTRUCTIONS.trim_end());
        assert!(prompt.user.starts_with("## Documentation\nKNOWLEDGE"));
        assert!(!prompt.user.contains(prompt.system));

        let text = prompt.to_text();
        assert!(text.starts_with(prompt.system));
        assert!(text.ends_with(&prompt.user));
    }
}
