//! Backend Error Module
//!
//! - **`types`** - `BackendError` taxonomy and status mapping
//! - **`conversion`** - `IntoResponse` for JSON error bodies

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;

/// Result alias for handlers and mutations
pub type BackendResult<T> = Result<T, BackendError>;
