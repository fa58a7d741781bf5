#[path = "../common/mod.rs"]
mod common;

use vipalink::protocol::frame::{validate_received, VipaCommand};
use vipalink::protocol::lrc;
use vipalink::Error;

#[test]
fn fixture_response_validates() {
    let packet = common::fixtures::version_response();
    let decoded = validate_received(&packet).expect("packet validates");
    assert_eq!(decoded.nad, 0x01);
    assert_eq!(decoded.pcb, 0x00);
    let payload = &decoded.payload;
    assert_eq!(&payload[payload.len() - 2..], &[0x90, 0x00]);
}

#[test]
fn reset_command_matches_captured_bytes() -> anyhow::Result<()> {
    // Captured from a real exchange trace.
    let expected = hex::decode("010005d000000100d5")?;
    let cmd = VipaCommand::new(0xD0, 0x00, 0x00, 0x01).with_le(0x00);
    assert_eq!(cmd.encode()?, expected);
    Ok(())
}

#[test]
fn display_command_roundtrip() {
    let cmd = VipaCommand::new(0xD2, 0x01, 0x00, 0x01)
        .with_data(b"mapp/idle_screen.html".to_vec())
        .with_le(0x00);
    let bytes = cmd.encode().expect("encode");
    assert_eq!(bytes[bytes.len() - 1], lrc(&bytes[..bytes.len() - 1]));
    assert_eq!(VipaCommand::decode(&bytes).expect("decode"), cmd);
}

#[test]
fn corrupted_fixture_fails_checksum() {
    let mut packet = common::fixtures::version_response();
    packet[4] ^= 0x01;
    assert!(matches!(
        validate_received(&packet),
        Err(Error::ChecksumMismatch { .. })
    ));
}
