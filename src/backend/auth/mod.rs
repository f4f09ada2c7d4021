//! Authentication Module
//!
//! Callers are identified by HS256 bearer tokens. Issuing credentials is
//! outside this server; it verifies tokens and resolves them to users.
//!
//! - **`sessions`** - token signing and verification (`TokenKeys`)
//! - **`handlers`** - `GET /api/auth/me`

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::get_me;
pub use sessions::{Claims, TokenKeys};
