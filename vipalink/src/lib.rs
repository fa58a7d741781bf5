// vipalink-rs/vipalink/src/lib.rs

//! vipalink
//!
//! Pure Rust driver core for Verifone VIPA payment terminals: the serial
//! APDU-style wire protocol (framing, LRC checksum, packet chaining) and the
//! device sub-workflow state machine that sequences multi-step operations
//! such as "report bundle versions" with timeout and cancellation.
#![warn(missing_docs)]

pub mod constants;
pub mod device;
pub mod error;
pub mod link;
pub mod prelude;
pub mod protocol;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;
pub mod workflow;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
