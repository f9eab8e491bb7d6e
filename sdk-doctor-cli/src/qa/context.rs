//! Project excerpts for grounding answers in the user's own code.

use crate::config::ScanConfig;
use crate::scanner::{collect_project_files, read_head, validate_root, Language, ScanError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct ContextLimits {
    pub max_files_per_language: usize,
    pub head_lines: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_files_per_language: 4,
            head_lines: 40,
        }
    }
}

/// Source heads grouped by language; replaced wholesale on rescan
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub scanned_at: DateTime<Utc>,
    excerpts: BTreeMap<Language, Vec<(PathBuf, Vec<String>)>>,
}

fn mentions_sdk(lines: &[String]) -> bool {
    lines.iter().any(|l| l.to_lowercase().contains("trustarc"))
}

impl ProjectContext {
    pub fn scan(root: &Path, scan: &ScanConfig, limits: &ContextLimits) -> Result<Self, ScanError> {
        let root = validate_root(root)?;
        let files = collect_project_files(root, scan);
        let mut excerpts = BTreeMap::new();

        for language in Language::ALL {
            let mut sdk = Vec::new();
            let mut other = Vec::new();
            for (_, rel) in files.sources_in(&[language]) {
                if sdk.len() >= limits.max_files_per_language {
                    break;
                }
                let Ok((lines, _)) = read_head(&root.join(rel), limits.head_lines) else {
                    debug!("Context: skipping unreadable {}", rel.display());
                    continue;
                };
                if mentions_sdk(&lines) {
                    sdk.push((rel.clone(), lines));
                } else if other.len() < limits.max_files_per_language {
                    other.push((rel.clone(), lines));
                }
            }
            sdk.extend(other);
            sdk.truncate(limits.max_files_per_language);
            if !sdk.is_empty() {
                excerpts.insert(language, sdk);
            }
        }

        debug!(
            "Project context for {}: {} files",
            root.display(),
            excerpts.values().map(Vec::len).sum::<usize>()
        );
        Ok(Self {
            root: root.to_path_buf(),
            scanned_at: Utc::now(),
            excerpts,
        })
    }

    pub fn file_count(&self) -> usize {
        self.excerpts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.excerpts.is_empty()
    }

    /// `--- <path> (<lang>) ---` blocks, at most `max_lines` lines in total
    pub fn render(&self, max_lines: usize) -> String {
        let mut out: Vec<String> = Vec::new();
        'outer: for (language, files) in &self.excerpts {
            for (path, lines) in files {
                if out.len() >= max_lines {
                    break 'outer;
                }
                out.push(format!("--- {} ({}) ---", path.display(), language.tag()));
                for line in lines {
                    if out.len() >= max_lines {
                        break 'outer;
                    }
                    out.push(line.clone());
                }
            }
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_sdk_files_come_first_and_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            write(dir.path(), &format!("src/{name}.kt"), "class Plain\n");
        }
        write(dir.path(), "src/z.kt", "import com.truste.androidmobileconsentsdk.TrustArc\n");

        let ctx = ProjectContext::scan(dir.path(), &ScanConfig::default(), &ContextLimits::default())
            .unwrap();
        assert_eq!(ctx.file_count(), 4);
        let rendered = ctx.render(100);
        assert!(rendered.starts_with("--- src/z.kt (kotlin) ---"));
    }

    #[test]
    fn test_head_lines_and_render_budget() {
        let dir = tempfile::tempdir().unwrap();
        let body: String = (0..100).map(|i| format!("let x{i} = {i};\n")).collect();
        write(dir.path(), "App.swift", &body);
        write(dir.path(), "index.js", "console.log('hi');\n");

        let limits = ContextLimits {
            head_lines: 10,
            ..Default::default()
        };
        let ctx = ProjectContext::scan(dir.path(), &ScanConfig::default(), &limits).unwrap();
        let full = ctx.render(1000);
        // swift (10 lines + header) before javascript (1 line + header)
        assert_eq!(full.lines().count(), 13);
        assert!(full.find("(swift)").unwrap() < full.find("(javascript)").unwrap());
        assert_eq!(ctx.render(5).lines().count(), 5);
    }

    #[test]
    fn test_empty_project() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::scan(dir.path(), &ScanConfig::default(), &ContextLimits::default())
            .unwrap();
        assert!(ctx.is_empty());
        assert_eq!(ctx.render(120), "");
    }
}
