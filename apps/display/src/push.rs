//! Push channel client with automatic reconnect.
//!
//! The server pings on a fixed period, so a connection that stays silent
//! longer than the idle timeout is treated as lost.

use std::time::Duration;

use futures::StreamExt;
use kioskfeed_core::constants::ANALYSIS_NEW_EVENT;
use kioskfeed_core::AnalysisResult;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Default read deadline: a little over two server ping periods.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

#[derive(Deserialize)]
struct PushFrame {
    event: String,
    data: Value,
}

/// Decodes an `analysis:new` frame. Other events and bad frames yield `None`.
pub fn parse_frame(text: &str) -> Option<AnalysisResult> {
    let frame: PushFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!("Ignoring malformed push frame: {}", err);
            return None;
        }
    };
    if frame.event != ANALYSIS_NEW_EVENT {
        debug!("Ignoring push event {}", frame.event);
        return None;
    }
    match serde_json::from_value(frame.data) {
        Ok(result) => Some(result),
        Err(err) => {
            warn!("Ignoring push frame with an invalid result: {}", err);
            None
        }
    }
}

/// Next reconnect delay: doubles up to a cap.
pub fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

pub struct PushClient {
    url: String,
    results: mpsc::Sender<AnalysisResult>,
    status: watch::Sender<ConnectionStatus>,
    idle_timeout: Duration,
}

impl PushClient {
    pub fn new(
        url: impl Into<String>,
        results: mpsc::Sender<AnalysisResult>,
    ) -> (Self, watch::Receiver<ConnectionStatus>) {
        let (status, status_rx) = watch::channel(ConnectionStatus::Connecting);
        (
            Self {
                url: url.into(),
                results,
                status,
                idle_timeout: DEFAULT_IDLE_TIMEOUT,
            },
            status_rx,
        )
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Connects and forwards results until the result receiver is dropped.
    pub async fn run(self) {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            self.status.send_replace(ConnectionStatus::Connecting);
            match connect_async(self.url.as_str()).await {
                Ok((mut stream, _)) => {
                    info!(url = %self.url, "Push channel connected");
                    self.status.send_replace(ConnectionStatus::Connected);
                    backoff = INITIAL_BACKOFF;

                    loop {
                        let message = match timeout(self.idle_timeout, stream.next()).await {
                            Ok(Some(message)) => message,
                            Ok(None) => break,
                            Err(_) => {
                                warn!("Push channel silent for {:?}", self.idle_timeout);
                                break;
                            }
                        };
                        match message {
                            Ok(Message::Text(text)) => {
                                if let Some(result) = parse_frame(text.as_str()) {
                                    if self.results.send(result).await.is_err() {
                                        return;
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(err) => {
                                debug!("Push channel read failed: {}", err);
                                break;
                            }
                        }
                    }
                    warn!("Push channel disconnected");
                }
                Err(err) => warn!("Push channel connect failed: {}", err),
            }

            self.status.send_replace(ConnectionStatus::Disconnected);
            if self.results.is_closed() {
                return;
            }
            debug!("Reconnecting push channel in {:?}", backoff);
            tokio::time::sleep(backoff).await;
            backoff = next_backoff(backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_json() -> Value {
        json!({
            "id": "abc",
            "companyName": "Acme",
            "vacancyTitle": "Kok",
            "idealCandidateImageUrl": "https://img.example/a.png",
            "content": { "format": "tips", "items": ["Noem salaris"] },
            "timestamp": "2025-03-01T12:00:00"
        })
    }

    #[test]
    fn analysis_frames_are_decoded() {
        let frame = json!({ "event": "analysis:new", "data": result_json() }).to_string();
        let result = parse_frame(&frame).unwrap();
        assert_eq!(result.id, "abc");
        assert_eq!(result.timestamp.timestamp_millis(), 1_740_830_400_000);
    }

    #[test]
    fn other_frames_are_ignored() {
        let other = json!({ "event": "kiosk:ping", "data": null }).to_string();
        assert!(parse_frame(&other).is_none());
        assert!(parse_frame("not json").is_none());
        let bad = json!({ "event": "analysis:new", "data": { "id": 1 } }).to_string();
        assert!(parse_frame(&bad).is_none());
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        assert_eq!(next_backoff(INITIAL_BACKOFF), Duration::from_secs(2));
        assert_eq!(next_backoff(Duration::from_secs(16)), MAX_BACKOFF);
        assert_eq!(next_backoff(MAX_BACKOFF), MAX_BACKOFF);
    }
}
