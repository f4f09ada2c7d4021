/**
 * Real-time Subscription Handler
 *
 * `GET /realtime` opens a Server-Sent Events stream for one connection.
 * The credential is the usual bearer header, or `?token=` for clients
 * (such as `EventSource`) that cannot set headers.
 *
 * The first event is `connected`, carrying the connection id the client
 * uses to join boards and to tag its own mutations. Each following event
 * is named by its envelope kind (`card:moved`, `user:joined`, ...) with
 * the envelope JSON as data.
 *
 * Dropping the stream disconnects, which leaves every joined board.
 */

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use tokio_stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::{authenticate, bearer_token};
use crate::backend::realtime::hub::{BoardHub, ConnectionId, Delivery};
use crate::backend::server::state::AppState;

/// Payload of the opening `connected` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Connected {
    pub connection_id: ConnectionId,
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub token: Option<String>,
}

/// Disconnects from the hub when the stream is dropped
struct ConnectionGuard {
    hub: BoardHub,
    id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.hub.disconnect(self.id);
    }
}

struct StreamState {
    greeting: Option<Event>,
    rx: mpsc::Receiver<Delivery>,
    _guard: ConnectionGuard,
}

/// Handle real-time subscription (GET /realtime)
pub async fn handle_realtime_subscription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SubscribeQuery>,
) -> BackendResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let token = bearer_token(&headers)
        .map(str::to_string)
        .or(query.token)
        .ok_or_else(|| {
            tracing::warn!("[Realtime] Subscription without credential");
            BackendError::unauthenticated("missing bearer token")
        })?;
    let user = authenticate(&state, &token).await?;

    let (connection_id, rx) = state.hub.connect(user.user_id);
    let guard = ConnectionGuard {
        hub: state.hub.clone(),
        id: connection_id,
    };

    let greeting = Event::default().event("connected").json_data(Connected {
        connection_id,
        user_id: user.user_id,
    })
    .map_err(|e| BackendError::internal(format!("connected event: {}", e)))?;

    let stream = stream::unfold(
        StreamState {
            greeting: Some(greeting),
            rx,
            _guard: guard,
        },
        |mut st| async move {
            if let Some(event) = st.greeting.take() {
                return Some((Ok(event), st));
            }
            loop {
                let delivery = st.rx.recv().await?;
                match Event::default().event(delivery.kind()).json_data(&*delivery) {
                    Ok(event) => return Some((Ok(event), st)),
                    Err(e) => {
                        tracing::error!("[Realtime] Failed to serialize {}: {}", delivery.kind(), e);
                        continue;
                    }
                }
            }
        },
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
