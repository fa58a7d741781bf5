// vipalink-rs/vipalink/src/protocol/mod.rs

//! VIPA wire protocol: LRC checksum, packet framing, command chaining and
//! chained-response reassembly.

pub mod chaining;
pub mod checksum;
pub mod frame;
pub mod reassembly;
pub mod tlv;

pub use chaining::{is_chained_response_command, requires_chaining, split_for_chaining};
pub use checksum::lrc;
pub use frame::{Packet, VipaCommand};
pub use reassembly::{FeedOutcome, ResponseAssembler};
pub use tlv::Tlv;
