/**
 * Server Initialization
 *
 * 1. Select the store from configuration
 * 2. Build `AppState` (store, board hub, token keys)
 * 3. Assemble the router
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::routes::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::{BoardStore, StoreError};
use crate::shared::AppConfig;

/// Create and configure the Axum application
pub async fn create_app(config: &AppConfig) -> Result<Router<()>, StoreError> {
    tracing::info!("[Server] Initializing taskboard backend");
    let store = load_store(config).await?;
    Ok(app_with_store(store, config.clone()))
}

/// Router over an already-built store
pub fn app_with_store(store: Arc<dyn BoardStore>, config: AppConfig) -> Router<()> {
    let state = AppState::new(store, config);
    tracing::info!(
        "[Server] Realtime queue depth {} per connection",
        state.config.channel_capacity
    );
    create_router(state)
}
