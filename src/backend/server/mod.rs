//! Server Module
//!
//! - **`state`** - `AppState` and its `FromRef` projections
//! - **`config`** - store selection from `AppConfig`
//! - **`init`** - application assembly
//!
//! # Example
//!
//! ```rust,no_run
//! use taskboard::backend::server::create_app;
//! use taskboard::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(&config).await?;
//! let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Store selection
pub mod config;

/// Server initialization
pub mod init;

pub use init::{app_with_store, create_app};
pub use state::AppState;
