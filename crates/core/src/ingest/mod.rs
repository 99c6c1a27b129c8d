//! Ingestion: normalize, stamp, store, publish.

pub mod ingest_model;
pub mod ingest_service;
pub mod ingest_traits;

pub use ingest_model::{IngestOutcome, StoreStats};
pub use ingest_service::{IngestService, SystemClock};
pub use ingest_traits::{Clock, IngestServiceTrait};
