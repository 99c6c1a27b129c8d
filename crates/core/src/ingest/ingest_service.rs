use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde_json::Value;

use super::ingest_model::{IngestOutcome, StoreStats};
use super::ingest_traits::{Clock, IngestServiceTrait};
use crate::errors::Result;
use crate::events::ResultSink;
use crate::normalizer::{NormalizationOutcome, Normalizer};
use crate::results::AnalysisResult;
use crate::store::RingStore;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Owns the result store and publishes every insertion to a sink.
///
/// The store lock is held across stamping, insertion and publishing, so
/// timestamps never go backwards and publish order equals insertion order.
pub struct IngestService {
    normalizer: Normalizer,
    store: Mutex<RingStore>,
    sink: Arc<dyn ResultSink>,
    clock: Arc<dyn Clock>,
}

impl IngestService {
    pub fn new(normalizer: Normalizer, store: RingStore, sink: Arc<dyn ResultSink>) -> Self {
        Self::with_clock(normalizer, store, sink, Arc::new(SystemClock))
    }

    pub fn with_clock(
        normalizer: Normalizer,
        store: RingStore,
        sink: Arc<dyn ResultSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            normalizer,
            store: Mutex::new(store),
            sink,
            clock,
        }
    }
}

impl IngestServiceTrait for IngestService {
    fn ingest(&self, body: &Value) -> Result<IngestOutcome> {
        let normalized = self.normalizer.normalize(body, self.clock.now());
        let mut result = normalized.result;

        let mut store = self.store.lock()?;
        let now = self.clock.now();
        result.timestamp = match store.last_timestamp() {
            Some(last) if last > now => last,
            _ => now,
        };

        if let Some(evicted) = store.add(result.clone()) {
            debug!("Result store full, evicted result {}", evicted.id);
        }
        self.sink.publish(&result);
        let size = store.size();
        drop(store);

        info!("Stored result {} ({} results held)", result.id, size);

        let (fallback, issues) = match normalized.outcome {
            NormalizationOutcome::Strict => (false, Vec::new()),
            NormalizationOutcome::Fallback { issues } => (true, issues),
        };
        Ok(IngestOutcome {
            result,
            fallback,
            issues,
        })
    }

    fn latest(&self) -> Result<Option<AnalysisResult>> {
        Ok(self.store.lock()?.latest().cloned())
    }

    fn recent(&self) -> Result<Vec<AnalysisResult>> {
        Ok(self.store.lock()?.all())
    }

    fn stats(&self) -> Result<StoreStats> {
        let store = self.store.lock()?;
        Ok(StoreStats {
            size: store.size(),
            capacity: store.capacity(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::events::MockResultSink;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    /// Clock that returns a scripted instant, settable from the test.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(instant: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(instant)))
        }

        fn set(&self, instant: DateTime<Utc>) {
            *self.0.lock().unwrap() = instant;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn body(company: &str) -> Value {
        json!({
            "company_name": company,
            "vacancy_title": "Kok",
            "ideal_candidate_image_url": "https://img.example/a.png",
            "analysis_content": "<p>Goed</p><ul><li>a</li></ul>",
        })
    }

    fn service(capacity: usize) -> (IngestService, MockResultSink, Arc<ManualClock>) {
        let sink = MockResultSink::new();
        let clock = ManualClock::at(start());
        let service = IngestService::with_clock(
            Normalizer::default(),
            RingStore::new(capacity).unwrap(),
            Arc::new(sink.clone()),
            clock.clone(),
        );
        (service, sink, clock)
    }

    #[test]
    fn test_ingest_stores_and_publishes() {
        let (service, sink, _) = service(5);
        assert!(service.latest().unwrap().is_none());

        let outcome = service.ingest(&body("Acme")).unwrap();
        assert!(!outcome.fallback);
        assert!(outcome.issues.is_empty());
        assert_eq!(sink.ids(), vec![outcome.result.id.clone()]);
        assert_eq!(service.latest().unwrap().unwrap().id, outcome.result.id);
        assert_eq!(service.stats().unwrap(), StoreStats { size: 1, capacity: 5 });
    }

    #[test]
    fn test_fallback_outcome_carries_issues() {
        let (service, sink, _) = service(5);
        let outcome = service.ingest(&json!({ "companyName": "Acme" })).unwrap();
        assert!(outcome.fallback);
        assert!(!outcome.issues.is_empty());
        assert!(outcome.result.is_fallback());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let (service, _, clock) = service(5);
        let first = service.ingest(&body("A")).unwrap().result;

        clock.set(start() - Duration::seconds(30));
        let second = service.ingest(&body("B")).unwrap().result;
        assert_eq!(second.timestamp, first.timestamp);

        clock.set(start() + Duration::seconds(1));
        let third = service.ingest(&body("C")).unwrap().result;
        assert!(third.timestamp > second.timestamp);

        let ids: Vec<String> = service.recent().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
        assert_eq!(service.latest().unwrap().unwrap().company_name, "C");
    }

    #[test]
    fn test_publish_order_matches_insertion_order() {
        let (service, sink, _) = service(2);
        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|company| service.ingest(&body(company)).unwrap().result.id)
            .collect();
        assert_eq!(sink.ids(), ids);
        assert_eq!(service.stats().unwrap().size, 2);
    }

    #[test]
    fn test_poisoned_store_commits_nothing() {
        let (service, sink, _) = service(5);
        let service = Arc::new(service);
        let poisoner = Arc::clone(&service);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.store.lock().unwrap();
            panic!("poison the store");
        })
        .join();

        let err = service.ingest(&body("Acme")).unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert!(sink.is_empty());
    }
}
