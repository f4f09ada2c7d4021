//! Backend Module
//!
//! The taskboard server: an Axum HTTP API over a persistence collaborator,
//! with a per-board realtime channel carrying every change to the other
//! clients that have the board open.
//!
//! # Architecture
//!
//! - **`store`** - `BoardStore` trait with in-memory and Postgres impls
//! - **`reader`** - assembles the full board aggregate in display order
//! - **`mutations`** - validated writes, one file per entity kind; each
//!   returns the value plus the board events it produced
//! - **`realtime`** - `BoardHub` topics, SSE stream, join/leave/publish
//! - **`handlers`** - HTTP adapters that run a mutation and publish it
//! - **`auth`** / **`middleware`** - bearer token verification
//! - **`routes`** / **`server`** - router assembly and `AppState`
//! - **`error`** - `BackendError` and its JSON response body
//!
//! # Request Flow
//!
//! ```text
//! request -> auth_middleware -> handler -> mutation -> BoardStore
//!                                  |
//!                                  +-> AppState::commit -> BoardHub -> SSE queues
//! ```
//!
//! Events are published only after the store write succeeded, and never
//! to the connection named in the request's `X-Connection-Id` header.
//!
//! # Concurrency
//!
//! Handlers run concurrently with no per-board lock. Two moves racing for
//! the same slot both succeed and whichever write lands last wins; equal
//! positions are ordered deterministically by the reader and repaired by
//! a background renumber.

/// Backend error types
pub mod error;

/// Persistence collaborator
pub mod store;

/// Board aggregate reader
pub mod reader;

/// Mutation handlers
pub mod mutations;

/// Real-time board channels
pub mod realtime;

/// HTTP handlers
pub mod handlers;

/// Bearer token verification
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Route configuration
pub mod routes;

/// Server setup and configuration
pub mod server;

pub use error::{BackendError, BackendResult};
pub use server::{create_app, AppState};
