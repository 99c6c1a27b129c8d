use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{config::Config, events::EventBus};
use kioskfeed_core::{
    events::ResultSink,
    ingest::{IngestService, IngestServiceTrait},
    normalizer::{ContentFormat, Normalizer},
    store::RingStore,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Capacity of the push broadcast channel.
const EVENT_BUS_CAPACITY: usize = 256;

/// Display timing handed to kiosks via `/api/config`.
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub display_seconds: u64,
    pub poll_interval_seconds: u64,
    pub content_format: ContentFormat,
}

pub struct AppState {
    pub ingest_service: Arc<dyn IngestServiceTrait + Send + Sync>,
    pub event_bus: EventBus,
    pub webhook_token: String,
    pub display: DisplaySettings,
    /// Heartbeat period on the push channel.
    pub push_ping_interval: Duration,
    pub started_at: Instant,
}

pub fn init_tracing() {
    let log_format = std::env::var("KIOSK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    let sink: Arc<dyn ResultSink> = Arc::new(event_bus.clone());
    let store = RingStore::new(config.store_capacity)?;
    let ingest_service: Arc<dyn IngestServiceTrait + Send + Sync> = Arc::new(IngestService::new(
        Normalizer::new(config.normalizer.clone()),
        store,
        sink,
    ));

    tracing::info!(
        "Result store ready (capacity {}, content format {}, split rule v{})",
        config.store_capacity,
        config.normalizer.content_format,
        config.normalizer.split_rule.version
    );

    Ok(Arc::new(AppState {
        ingest_service,
        event_bus,
        webhook_token: config.webhook_token.clone(),
        display: DisplaySettings {
            display_seconds: config.display_seconds,
            poll_interval_seconds: config.poll_interval_secs,
            content_format: config.normalizer.content_format,
        },
        push_ping_interval: config.push_ping_interval,
        started_at: Instant::now(),
    }))
}
