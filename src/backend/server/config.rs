/**
 * Store Selection
 *
 * Picks the persistence collaborator from `AppConfig`:
 *
 * - `database_url` set: connect a Postgres pool and run migrations
 * - otherwise: the in-memory store, which forgets everything on exit
 */

use std::sync::Arc;

use crate::backend::store::{BoardStore, MemoryStore, PgStore, StoreError};
use crate::shared::AppConfig;

/// Build the store named by the configuration
pub async fn load_store(config: &AppConfig) -> Result<Arc<dyn BoardStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("[Store] Connecting to database...");
            let store = PgStore::connect(url).await.map_err(|e| {
                tracing::error!("[Store] Failed to open database: {}", e);
                e
            })?;
            tracing::info!("[Store] Database connected and migrated");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("[Store] DATABASE_URL not set, using in-memory store (no persistence)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_without_database_url() {
        let store = load_store(&AppConfig::default()).await.unwrap();
        assert!(store.list_boards().await.unwrap().is_empty());
    }
}
