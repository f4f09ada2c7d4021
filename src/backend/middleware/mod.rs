//! Middleware Module
//!
//! Request processing that runs before the board handlers.
//!
//! - **`auth`** - bearer token verification and the `AuthUser` extractor
//! - **`origin`** - `X-Connection-Id` extraction for echo suppression

pub mod auth;

pub mod origin;

pub use auth::{auth_middleware, authenticate, bearer_token, AuthUser, AuthenticatedUser};
pub use origin::{OriginConnection, CONNECTION_ID_HEADER};
