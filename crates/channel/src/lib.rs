//! Transport channel for correlated generation jobs.
//!
//! Wraps one outbound persistent WebSocket connection per job. The
//! channel emits a lazy sequence of inbound messages, accepts outbound
//! messages, and owns the open/close lifecycle: `close` is idempotent,
//! runs on drop, and messages buffered before a close request are still
//! delivered (deliver-then-stop).

mod channel;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use channel::{Channel, ChannelError, ChannelMessage};
