//! Normalizer configuration and outcome models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::results::AnalysisResult;

/// Canonical content representation for a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentFormat {
    /// Lead paragraph plus tip list, both HTML.
    #[default]
    Html,
    /// A list of short plain-text tips.
    Tips,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Html => "html",
            ContentFormat::Tips => "tips",
        }
    }
}

impl FromStr for ContentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ContentFormat::Html),
            "tips" => Ok(ContentFormat::Tips),
            other => Err(Error::invalid_config(format!(
                "unknown content format '{other}' (expected 'html' or 'tips')"
            ))),
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Versioned rule for splitting upstream HTML into a lead paragraph and a
/// tip list.
///
/// The upstream producer prepends a heading line (for example a match
/// percentage) that is dropped, then the markup is cut at the first list
/// marker. Everything before the marker is the lead paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRule {
    pub version: u32,
    pub heading_marker: String,
    pub list_marker: String,
}

impl SplitRule {
    /// The rule used by the first upstream output format.
    pub fn v1() -> Self {
        Self {
            version: 1,
            heading_marker: "##".to_string(),
            list_marker: "<ul>".to_string(),
        }
    }

    /// Drops the first line when it starts with the heading marker.
    pub fn strip_heading<'a>(&self, markup: &'a str) -> &'a str {
        if self.heading_marker.is_empty() {
            return markup.trim();
        }
        let (first, rest) = match markup.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (markup, ""),
        };
        if first.trim().starts_with(self.heading_marker.as_str()) {
            rest.trim()
        } else {
            markup.trim()
        }
    }

    /// Splits markup into `(paragraph, tips)` at the first list marker.
    ///
    /// Without a marker the whole markup is the tip list and the paragraph
    /// is empty.
    pub fn split<'a>(&self, markup: &'a str) -> (&'a str, &'a str) {
        if self.list_marker.is_empty() {
            return ("", markup.trim());
        }
        match markup.find(self.list_marker.as_str()) {
            Some(index) => (markup[..index].trim(), markup[index..].trim()),
            None => ("", markup.trim()),
        }
    }
}

impl Default for SplitRule {
    fn default() -> Self {
        Self::v1()
    }
}

/// Normalizer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub content_format: ContentFormat,
    pub split_rule: SplitRule,
}

/// One field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Which normalization path produced a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizationOutcome {
    Strict,
    Fallback { issues: Vec<ValidationIssue> },
}

/// A normalized result together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub result: AnalysisResult,
    pub outcome: NormalizationOutcome,
}

impl Normalized {
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, NormalizationOutcome::Fallback { .. })
    }
}
