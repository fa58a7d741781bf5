// vipalink-rs/vipalink/src/transport/mod.rs

//! Byte-level port access.
//!
//! The link layer talks to a [`Transport`] trait object so the protocol
//! stack runs unchanged over a real serial port or the in-memory mock.

pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;
pub mod traits;

pub use mock::{MockState, MockTransport};
#[cfg(feature = "serial")]
pub use serial::{SerialSettings, SerialTransport};
pub use traits::Transport;
