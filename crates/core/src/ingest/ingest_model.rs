use serde::Serialize;

use crate::normalizer::ValidationIssue;
use crate::results::AnalysisResult;

/// A stored result and how it was normalized.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub result: AnalysisResult,
    pub fallback: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Store occupancy, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub size: usize,
    pub capacity: usize,
}
