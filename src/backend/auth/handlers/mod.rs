//! Authentication Handlers
//!
//! - **`get_me`** - GET /api/auth/me - the authenticated user

/// Get current user handler
pub mod me;

pub use me::get_me;
