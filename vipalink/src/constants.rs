// vipalink-rs/vipalink/src/constants.rs
//! Common protocol constants used across the crate

/// NAD value addressing the terminal itself.
pub const NAD_TERMINAL: u8 = 0x01;

/// NAD value used by contactless (CLess) frames.
pub const NAD_CONTACTLESS: u8 = 0x02;

/// PCB bit 0: set on every packet of a chain except the last.
pub const PCB_CHAIN_BIT: u8 = 0x01;

/// Fixed transmit header length: CLA, INS, P1, P2.
pub const TX_HEADER_LEN: usize = 0x04;

/// Minimal receivable packet: NAD, PCB, LEN, LRC.
pub const MIN_PACKET_LEN: usize = 0x04;

/// A command whose header (4) plus data length reaches this value must be
/// written as a chained sequence of packets.
pub const CHAINED_COMMAND_MIN_LEN: usize = 0xFE;

/// Base chained payload size; the first and continuation packets carry
/// `CHAINED_COMMAND_PAYLOAD_LEN + 1` data bytes each.
pub const CHAINED_COMMAND_PAYLOAD_LEN: usize = 0xF8;

/// Data bytes carried by the first packet and each continuation packet of a
/// chained command.
pub const CHAINED_PACKET_DATA_LEN: usize = CHAINED_COMMAND_PAYLOAD_LEN + 1;

/// Largest single raw read from the port: header plus maximum LEN payload.
pub const RAW_READ_LEN: usize = TX_HEADER_LEN + 0xFB;

/// Accumulation capacity for an unchained response.
pub const UNCHAINED_RESPONSE_BUFFER_LEN: usize = RAW_READ_LEN * 4;

/// Accumulation capacity for a chained response. Reassembled chained
/// payloads (signature images) run an order of magnitude larger than one
/// raw read.
pub const CHAINED_RESPONSE_BUFFER_LEN: usize = UNCHAINED_RESPONSE_BUFFER_LEN * 10;

/// SW1 of the success status pair.
pub const SW1_SUCCESS: u8 = 0x90;

/// SW2 of the success status pair.
pub const SW2_SUCCESS: u8 = 0x00;

/// Reader idle delay between polls when nothing is pending. Engage devices
/// have a faster processor than UX devices; adjust with care.
pub const PORT_READ_IDLE_DELAY_MS: u64 = 50;

/// Poll delay while a chained response is mid-flight.
pub const PORT_READ_CHAIN_POLL_MS: u64 = 1;

/// Per-chunk read timeout handed to the transport by the reader task.
pub const PORT_READ_CHUNK_TIMEOUT_MS: u64 = 100;

/// Minimum quiescent period after closing the port before it may be
/// reopened. The OS can take a moment to release the underlying handle and
/// reopening too quickly fails intermittently.
pub const PORT_REOPEN_QUIESCENT_MS: u64 = 250;

/// Marker substring in a DisplayHtml payload that signals the terminal will
/// answer with a chained response (signature capture).
pub const CHAINED_RESPONSE_MARKER: &str = "signature.html";

/// Default timeout for one device-level operation run under the
/// cancellation broker.
pub const DEVICE_ACTION_TIMEOUT_MS: u64 = 30_000;
