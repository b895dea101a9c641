//! Server-Sent Events for the live admin dashboard.
//!
//! The stream carries change signals, not data. A dashboard that receives
//! an event re-queries `/api/admin/dashboard/stats` for fresh numbers.

#![allow(missing_docs)]

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::{extractors::AuthAdmin, middleware::AppState};

/// SSE event types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SseEvent {
    /// Moderation or termination state changed.
    Changed {
        seq: u64,
        at: DateTime<Utc>,
        new_signups: u64,
    },
    /// A new account signed up.
    SignedUp {
        seq: u64,
        at: DateTime<Utc>,
        new_signups: u64,
    },
    /// Connection established.
    Connected,
}

/// Broadcast channel feeding dashboard SSE connections.
#[derive(Clone)]
pub struct DashboardBroadcaster {
    tx: broadcast::Sender<SseEvent>,
}

impl DashboardBroadcaster {
    /// Create a new broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1000);
        Self { tx }
    }

    /// Broadcast an event to all connected dashboards.
    pub fn broadcast(&self, event: SseEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to dashboard events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.tx.subscribe()
    }

    /// Number of connected dashboards.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for DashboardBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Dashboard SSE stream (admin only).
async fn dashboard_stream(
    AuthAdmin(_admin): AuthAdmin,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.dashboard_broadcaster.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        result.ok().map(|event| {
            Ok(Event::default()
                .json_data(&event)
                .unwrap_or_else(|_| Event::default().data("error")))
        })
    });

    let initial = stream::once(async {
        Ok(Event::default()
            .json_data(&SseEvent::Connected)
            .unwrap_or_else(|_| Event::default().data("connected")))
    });

    Sse::new(initial.chain(stream)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// Create SSE router.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard_stream))
}
