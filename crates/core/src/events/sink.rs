//! Result sink trait and implementations.

use std::sync::{Arc, Mutex};

use crate::results::AnalysisResult;

/// Trait for receiving newly stored results.
///
/// # Design Rules
///
/// - `publish()` must be fast and non-blocking (no network calls)
/// - Delivery is best-effort: a sink with no listeners drops the result
/// - Failure to publish must not affect the store
pub trait ResultSink: Send + Sync {
    /// Publish a single stored result.
    fn publish(&self, result: &AnalysisResult);
}

/// No-op implementation for tests or contexts without subscribers.
#[derive(Clone, Default)]
pub struct NoOpResultSink;

impl ResultSink for NoOpResultSink {
    fn publish(&self, _result: &AnalysisResult) {}
}

/// Mock sink for testing - collects published results.
#[derive(Clone, Default)]
pub struct MockResultSink {
    results: Arc<Mutex<Vec<AnalysisResult>>>,
}

impl MockResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected results in publish order.
    pub fn results(&self) -> Vec<AnalysisResult> {
        self.results.lock().unwrap().clone()
    }

    /// Returns the ids of collected results in publish order.
    pub fn ids(&self) -> Vec<String> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .map(|result| result.id.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.results.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.lock().unwrap().is_empty()
    }
}

impl ResultSink for MockResultSink {
    fn publish(&self, result: &AnalysisResult) {
        self.results.lock().unwrap().push(result.clone());
    }
}
