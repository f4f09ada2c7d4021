//! Shared Module
//!
//! Types used on both sides of the wire: the workspace and board data
//! model with its hydrated views, the position allocator, realtime event
//! envelopes, and the client-side merge that folds those events into a
//! local board.

/// Fractional position allocation and sibling ordering
pub mod position;

/// Board data model and hydrated views
pub mod board;

/// Realtime board events
pub mod event;

/// Client-side merge of board events
pub mod merge;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

pub use board::{BoardView, CardView, ChecklistView, CommentView, ListView, WorkspaceView};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::{BoardEnvelope, BoardEvent};
pub use position::{allocate, PositionError, GAP};
