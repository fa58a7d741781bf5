// vipalink-rs/vipalink/src/test_support.rs

//! Builders for tests that need raw terminal responses.
//!
//! Compiled into the crate so both in-file unit tests and the `tests/`
//! integration suites share one set of packet builders.

use crate::constants::{SW1_SUCCESS, SW2_SUCCESS};
use crate::protocol::checksum::lrc;

/// Build a response packet as the terminal would send it.
///
/// `NAD PCB LEN data… [SW1 SW2] LRC`; `with_status` appends the `90 00`
/// success trailer inside the LEN-counted region.
pub fn response_packet(nad: u8, pcb: u8, data: &[u8], with_status: bool) -> Vec<u8> {
    let status_len = if with_status { 2 } else { 0 };
    let mut out = Vec::with_capacity(3 + data.len() + status_len + 1);
    out.push(nad);
    out.push(pcb);
    out.push((data.len() + status_len) as u8);
    out.extend_from_slice(data);
    if with_status {
        out.push(SW1_SUCCESS);
        out.push(SW2_SUCCESS);
    }
    out.push(lrc(&out));
    out
}

/// Build a response packet with an arbitrary status trailer.
pub fn response_packet_with_status(nad: u8, pcb: u8, data: &[u8], sw1: u8, sw2: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + data.len() + 3);
    out.push(nad);
    out.push(pcb);
    out.push((data.len() + 2) as u8);
    out.extend_from_slice(data);
    out.push(sw1);
    out.push(sw2);
    out.push(lrc(&out));
    out
}

/// Encode a BER-TLV element with a one-byte tag for response payloads.
pub fn tlv_bytes(tag: u8, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + value.len() + 2);
    out.push(tag);
    if value.len() < 0x80 {
        out.push(value.len() as u8);
    } else if value.len() <= 0xFF {
        out.push(0x81);
        out.push(value.len() as u8);
    } else {
        out.push(0x82);
        out.push((value.len() >> 8) as u8);
        out.push((value.len() & 0xFF) as u8);
    }
    out.extend_from_slice(value);
    out
}
