//! SDK version tokens as written in manifests.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("unparsable version string `{0}`")]
    Unparsable(String),
}

/// A dotted numeric version, e.g. `2025.01.1` or `2.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkVersion {
    /// The token without range operators, as displayed
    pub text: String,
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

static VERSION: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION.get_or_init(|| Regex::new(r"^\d+\.\d+(?:\.\d+)?(?:[-+][0-9A-Za-z.\-]+)?$").unwrap())
}

impl SdkVersion {
    /// Parse a manifest version token.
    ///
    /// Range operators used by CocoaPods, npm and pub (`~>`, `^`, `>=`, ...)
    /// are stripped first. Gradle variables such as `$sdkVersion` are
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let text = raw
            .trim()
            .trim_start_matches(['~', '>', '<', '=', '^', 'v'])
            .trim();
        if !version_re().is_match(text) {
            return Err(VersionError::Unparsable(raw.to_string()));
        }
        Ok(Self {
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_versions() {
        let v = SdkVersion::parse("2025.01.1").unwrap();
        assert_eq!(v.to_string(), "2025.01.1");
        assert_eq!(SdkVersion::parse(" 2.1 ").unwrap().text, "2.1");
    }

    #[test]
    fn test_range_operators_are_stripped() {
        assert_eq!(SdkVersion::parse("~> 2.1").unwrap().to_string(), "2.1");
        assert_eq!(SdkVersion::parse("^1.4.0").unwrap().to_string(), "1.4.0");
        assert_eq!(SdkVersion::parse(">=3.0.0").unwrap().text, "3.0.0");
        assert_eq!(SdkVersion::parse("1.0.0-beta.2").unwrap().text, "1.0.0-beta.2");
    }

    #[test]
    fn test_unparsable_tokens() {
        for raw in ["$trustarcVersion", "latest", "+", "", "1"] {
            assert_eq!(
                SdkVersion::parse(raw),
                Err(VersionError::Unparsable(raw.to_string())),
                "{raw}"
            );
        }
    }
}
