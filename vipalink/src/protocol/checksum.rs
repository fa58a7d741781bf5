// vipalink-rs/vipalink/src/protocol/checksum.rs

/// Compute the Longitudinal Redundancy Check for a VIPA packet.
/// LRC = running XOR of every byte from NAD through the byte preceding
/// the LRC itself.
pub fn lrc(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}
