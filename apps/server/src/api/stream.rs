//! Push channel: one WebSocket per kiosk, one text frame per stored result.
//!
//! The server pings every subscriber on a fixed period. A subscriber that
//! sends nothing back (not even a pong) for two periods is dropped, so a
//! half-open connection does not linger.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::main_lib::AppState;

async fn stream_results(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    let mut events = BroadcastStream::new(state.event_bus.subscribe());
    let (mut sender, mut receiver) = socket.split();
    let ping_interval = state.push_ping_interval;
    let mut heartbeat = interval_at(Instant::now() + ping_interval, ping_interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();
    info!(%connection_id, "Push subscriber connected");

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(frame) => frame,
                        Err(err) => {
                            warn!(%connection_id, "Failed to serialize push frame: {}", err);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!(%connection_id, skipped, "Push subscriber lagged; events dropped");
                }
                None => break,
            },
            _ = heartbeat.tick() => {
                if last_seen.elapsed() > ping_interval * 2 {
                    warn!(%connection_id, "Push subscriber stopped answering pings");
                    break;
                }
                if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Text(text))) => {
                    last_seen = Instant::now();
                    debug!(%connection_id, "Ignoring inbound message: {}", text.as_str());
                }
                Some(Ok(_)) => last_seen = Instant::now(),
                Some(Err(err)) => {
                    debug!(%connection_id, "Push connection error: {}", err);
                    break;
                }
            },
        }
    }

    info!(%connection_id, "Push subscriber disconnected");
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(stream_results))
}
