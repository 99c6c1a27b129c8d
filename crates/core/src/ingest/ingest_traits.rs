use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ingest_model::{IngestOutcome, StoreStats};
use crate::errors::Result;
use crate::results::AnalysisResult;

/// Source of "now" for timestamp assignment.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Trait for the ingestion pipeline and the reads the delivery layer needs.
pub trait IngestServiceTrait: Send + Sync {
    /// Normalizes `body`, stores the result and publishes it.
    ///
    /// Either the result is stored and published, or neither happens.
    fn ingest(&self, body: &Value) -> Result<IngestOutcome>;

    /// Most recent result by timestamp.
    fn latest(&self) -> Result<Option<AnalysisResult>>;

    /// All held results, ascending by timestamp.
    fn recent(&self) -> Result<Vec<AnalysisResult>>;

    fn stats(&self) -> Result<StoreStats>;
}
