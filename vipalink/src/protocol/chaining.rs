// vipalink-rs/vipalink/src/protocol/chaining.rs

//! Splitting oversized commands into chained packet sequences.
//!
//! PCB for a chained command: bit 0 set for all packets, except the last.
//! ```text
//! 1st packet       : NAD PCB(bit 0 set)   LEN CLA INS P1 P2 Lc Data… LRC
//! 2nd – nth packet : NAD PCB(bit 0 set)   LEN Data… LRC
//! Last packet      : NAD PCB(bit 0 unset) LEN Data… LRC
//! ```

use crate::constants::{
    CHAINED_COMMAND_MIN_LEN, CHAINED_PACKET_DATA_LEN, CHAINED_RESPONSE_MARKER, PCB_CHAIN_BIT,
    TX_HEADER_LEN,
};
use crate::protocol::checksum::lrc;
use crate::protocol::frame::VipaCommand;
use crate::types::VipaCommandType;
use crate::{Error, Result};

/// Whether the command is too large for a single packet.
pub fn requires_chaining(command: &VipaCommand) -> bool {
    let data_len = command.data.as_ref().map_or(0, |d| d.len());
    TX_HEADER_LEN + data_len >= CHAINED_COMMAND_MIN_LEN
}

/// Whether the terminal answers this command with a chained response.
///
/// Closed rule: the reset command, or the HTML-display command whose
/// payload names the signature page. Other command types rely on
/// unchained response handling; do not generalize.
pub fn is_chained_response_command(command: &VipaCommand) -> bool {
    let (cla, ins) = command.class_ins();
    match VipaCommandType::from_class_ins(cla, ins) {
        Some(VipaCommandType::ResetDevice) => true,
        Some(VipaCommandType::DisplayHtml) => command.data.as_ref().is_some_and(|data| {
            String::from_utf8_lossy(data)
                .to_lowercase()
                .contains(CHAINED_RESPONSE_MARKER)
        }),
        _ => false,
    }
}

/// Split a command that [`requires_chaining`] into its ordered packets.
///
/// The first packet is header-bearing with a fixed LEN of 0xFE and carries
/// `0xF8 + 1` data bytes; continuation packets carry the same fixed data
/// length while more than 0xFE bytes remain (a shorter would-be
/// continuation folds into the last packet); the last packet clears PCB
/// bit 0 and carries the remainder.
pub fn split_for_chaining(command: &VipaCommand) -> Result<Vec<Vec<u8>>> {
    if !requires_chaining(command) {
        return Err(Error::Encoding(
            "command fits a single packet".to_string(),
        ));
    }
    let data = command
        .data
        .as_deref()
        .ok_or_else(|| Error::Encoding("chained command without data field".to_string()))?;

    let mut packets = Vec::with_capacity(data.len() / CHAINED_PACKET_DATA_LEN + 1);
    packets.push(first_packet(command, &data[..CHAINED_PACKET_DATA_LEN]));

    let mut offset = CHAINED_PACKET_DATA_LEN;
    while data.len() - offset > CHAINED_COMMAND_MIN_LEN {
        packets.push(next_packet(
            command.nad,
            PCB_CHAIN_BIT,
            &data[offset..offset + CHAINED_PACKET_DATA_LEN],
        ));
        offset += CHAINED_PACKET_DATA_LEN;
    }

    // Last packet: continuation bit clear, remainder as payload.
    packets.push(next_packet(command.nad, 0x00, &data[offset..]));
    Ok(packets)
}

fn first_packet(command: &VipaCommand, chunk: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + CHAINED_COMMAND_MIN_LEN + 1);
    out.push(command.nad);
    out.push(PCB_CHAIN_BIT);
    out.push(CHAINED_COMMAND_MIN_LEN as u8);
    out.push(command.cla);
    out.push(command.ins);
    out.push(command.p1);
    out.push(command.p2);
    // The Lc byte holds the length of the data carried by this packet,
    // capped at 0xFF.
    out.push((CHAINED_COMMAND_MIN_LEN + 1) as u8);
    out.extend_from_slice(chunk);
    out.push(lrc(&out));
    out
}

fn next_packet(nad: u8, pcb: u8, chunk: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + chunk.len() + 1);
    out.push(nad);
    out.push(pcb);
    out.push(chunk.len() as u8);
    out.extend_from_slice(chunk);
    out.push(lrc(&out));
    out
}
