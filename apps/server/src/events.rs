use kioskfeed_core::constants::ANALYSIS_NEW_EVENT;
use kioskfeed_core::events::ResultSink;
use kioskfeed_core::AnalysisResult;
use serde::Serialize;
use tokio::sync::broadcast;

/// Frame sent to push subscribers: `{"event": ..., "data": ...}`.
#[derive(Clone, Debug, Serialize)]
pub struct PushEvent {
    pub event: &'static str,
    pub data: AnalysisResult,
}

impl PushEvent {
    pub fn analysis_new(result: AnalysisResult) -> Self {
        Self {
            event: ANALYSIS_NEW_EVENT,
            data: result,
        }
    }
}

/// Lightweight broadcast bus that fans out results to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PushEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.sender.subscribe()
    }

    pub fn send(&self, event: PushEvent) {
        // No subscribers is fine; lagging ones skip ahead on their own.
        let _ = self.sender.send(event);
    }

    /// Number of live push subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ResultSink for EventBus {
    fn publish(&self, result: &AnalysisResult) {
        self.send(PushEvent::analysis_new(result.clone()));
    }
}
