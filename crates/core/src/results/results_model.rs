//! Analysis result domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::flexible_timestamp;

/// Canonical, post-normalization analysis result.
///
/// Created by the normalizer, stamped by the ingest service and immutable
/// afterwards. `score`, when present, is always within `[0, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub company_name: String,
    pub vacancy_title: String,
    pub ideal_candidate_image_url: String,
    pub content: AnalysisContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResultMeta>,
}

impl AnalysisResult {
    /// Returns true when the result was produced by the fallback path.
    pub fn is_fallback(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|meta| meta.source.as_deref())
            .is_some_and(|source| source == crate::constants::FALLBACK_SOURCE)
    }
}

/// Advisory content in the shape the deployment renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "format", rename_all = "camelCase")]
pub enum AnalysisContent {
    /// Lead paragraph and tip list as HTML fragments.
    Html { paragraph: String, tips: String },
    /// Plain advisory strings, already escaped.
    Tips { items: Vec<String> },
}

impl AnalysisContent {
    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        match self {
            AnalysisContent::Html { paragraph, tips } => {
                paragraph.trim().is_empty() && tips.trim().is_empty()
            }
            AnalysisContent::Tips { items } => items.is_empty(),
        }
    }
}

/// Provenance of a result. Informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}
