/**
 * Application State
 *
 * `AppState` is the one value every handler extracts. Its parts are cheap
 * to clone: the store sits behind an `Arc`, the hub and token keys are
 * reference-counted internally.
 *
 * `FromRef` lets a handler ask for only the part it needs, e.g.
 * `State(hub): State<BoardHub>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::sessions::TokenKeys;
use crate::backend::mutations::{reorder, Applied};
use crate::backend::realtime::{BoardHub, ConnectionId};
use crate::backend::store::BoardStore;
use crate::shared::AppConfig;

#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator (memory or Postgres)
    pub store: Arc<dyn BoardStore>,

    /// Per-board broadcast channels
    pub hub: BoardHub,

    /// Bearer token verification
    pub tokens: TokenKeys,

    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn BoardStore>, config: AppConfig) -> Self {
        Self {
            store,
            hub: BoardHub::new(config.channel_capacity),
            tokens: TokenKeys::new(&config.jwt_secret),
            config: Arc::new(config),
        }
    }

    /// Publish a mutation's events and return its value.
    ///
    /// `origin` is the caller's own realtime connection, which is skipped.
    /// A pending renumber runs on a spawned task and publishes its own
    /// events when done.
    pub fn commit<T>(&self, applied: Applied<T>, origin: Option<ConnectionId>) -> T {
        let Applied {
            board_id,
            value,
            events,
            repair,
        } = applied;

        for event in events {
            self.hub.publish(board_id, event, origin);
        }

        if let Some(set) = repair {
            let store = self.store.clone();
            let hub = self.hub.clone();
            tokio::spawn(async move {
                match reorder::repair(store.as_ref(), set).await {
                    Ok(Some((board_id, events))) => {
                        for event in events {
                            hub.publish(board_id, event, None);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!("[Board] Background renumber of {:?} failed: {}", set, e);
                    }
                }
            });
        }

        value
    }
}

impl FromRef<AppState> for BoardHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

impl FromRef<AppState> for Arc<dyn BoardStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}
