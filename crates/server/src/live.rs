// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live booking updates for dashboards.
//!
//! The coordinator hands every committed [`LifecycleEvent`] to a
//! [`LiveEventBroadcaster`], which pushes it to each open `/live` socket.
//! Frames describe changes already in the store and are never authoritative.

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use plotdesk_api::LifecycleNotifier;
use plotdesk_audit::LifecycleEvent;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::AppState;

/// Events a subscriber may fall behind by before it starts losing them.
const LIVE_BUFFER_CAPACITY: usize = 100;

/// Frames pushed to live subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A booking was created or transitioned.
    BookingChanged(LifecycleEvent),
    /// First frame on every connection.
    Connected {
        /// Server time in RFC 3339.
        timestamp: String,
    },
}

impl LiveEvent {
    fn connected_now() -> Self {
        Self::Connected {
            timestamp: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        }
    }
}

/// Fan-out point between the coordinator and live subscribers.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    sender: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a broadcaster with the default buffer.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(LIVE_BUFFER_CAPACITY);
        Self { sender }
    }

    /// Publishes `event` and returns how many subscribers it reached.
    ///
    /// Publishing with nobody listening is not an error.
    pub fn publish(&self, event: LiveEvent) -> usize {
        let delivered: usize = self.sender.send(event).unwrap_or(0);
        debug!(subscribers = delivered, "Published live event");
        delivered
    }

    /// Opens a subscription that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.sender.subscribe()
    }

    /// Number of open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleNotifier for LiveEventBroadcaster {
    fn notify(&self, event: &LifecycleEvent) {
        self.publish(LiveEvent::BookingChanged(event.clone()));
    }
}

/// Handler for GET `/live`.
///
/// Upgrades to a WebSocket that streams committed booking changes. The
/// stream is read-only; clients re-read bookings over HTTP before acting.
pub async fn handle_live_upgrade(
    upgrade: WebSocketUpgrade,
    AxumState(app_state): AxumState<AppState>,
) -> Response {
    let events = app_state.broadcaster.subscribe();
    upgrade.on_upgrade(move |socket| stream_events(socket, events))
}

async fn stream_events(socket: WebSocket, mut events: broadcast::Receiver<LiveEvent>) {
    info!("Live subscriber connected");
    let (mut outbound, mut inbound) = socket.split();

    let mut pending: Option<LiveEvent> = Some(LiveEvent::connected_now());
    loop {
        if let Some(event) = pending.take() {
            let Ok(frame) = serde_json::to_string(&event) else {
                warn!(?event, "Dropping live event that failed to serialize");
                continue;
            };
            if outbound.send(Message::Text(frame.into())).await.is_err() {
                debug!("Live subscriber went away mid-send");
                break;
            }
        }

        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => pending = Some(event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Live subscriber lagged; events skipped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = inbound.next() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                    debug!("Ignoring inbound frame on read-only live stream");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            },
        }
    }

    info!("Live subscriber disconnected");
}
