//! Route Configuration Module
//!
//! - **`router`** - `create_router`, the assembled application router
//! - **`api_routes`** - the authenticated `/api` and realtime control routes

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
