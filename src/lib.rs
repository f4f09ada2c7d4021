//! Taskboard - Collaborative Task Board Server
//!
//! Taskboard organizes work into boards, lists and cards (with labels,
//! members, checklists and comments). Several clients can keep the same
//! board open; every change one of them makes is fanned out to the others
//! over a per-board realtime channel.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and clients
//!   - Board data model and hydrated views
//!   - Position allocator for fractional ordering
//!   - Realtime event envelopes and the client-side merge
//!   - Configuration and error types
//!
//! - **`backend`** - The server
//!   - Axum HTTP API for reads and mutations
//!   - Board aggregate reader and mutation handlers
//!   - Per-board broadcast hub with SSE delivery
//!   - Persistence behind the `BoardStore` trait (memory or Postgres)
//!
//! # Ordering
//!
//! Lists, cards, checklists and checklist items carry a floating point
//! `position`. A move writes only the moved item's position (midpoint of its
//! new neighbours), so a reorder is one write regardless of list length.
//! See [`shared::position`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use taskboard::backend::server::init::create_app;
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
//!
//! # Thread Safety
//!
//! - The in-memory store sits behind a `tokio::sync::RwLock`
//! - The broadcast hub serializes join/leave/disconnect under one mutex
//! - Per-connection delivery uses bounded `tokio::sync::mpsc` queues

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
