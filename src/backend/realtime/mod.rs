//! Real-time Board Channels
//!
//! Each board has a topic; every realtime connection that joined it
//! receives the board's events. Mutations publish through the hub after
//! they commit, skipping the connection that caused them.
//!
//! - **`hub`** - `BoardHub`, the in-process topic registry and fan-out
//! - **`subscription`** - `GET /realtime`, the Server-Sent Events stream
//! - **`handlers`** - join, leave and publish over HTTP POST
//!
//! # Delivery
//!
//! Every connection owns a bounded FIFO queue. Publishing never waits:
//! an event that finds the queue full or closed is dropped for that
//! connection only. Events from one publisher arrive in publish order.
//!
//! # Presence
//!
//! Joining a board sends `user:joined` to every subscriber including the
//! joiner. `user:left` goes to those that remain once the user's last
//! connection on the board leaves or disconnects. Both carry the distinct
//! users still present, in join order.

/// Topic registry and fan-out
pub mod hub;

/// Server-Sent Events subscription handler
pub mod subscription;

/// Join, leave and publish endpoints
pub mod handlers;

pub use hub::{BoardHub, ConnectionId, Delivery, RealtimeError};
pub use subscription::handle_realtime_subscription;
