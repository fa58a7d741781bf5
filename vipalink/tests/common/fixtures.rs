// fixtures.rs — commonly used packets, payloads and mock-backed links

use std::sync::{Arc, Mutex, Once};
use vipalink::link::SerialLink;
use vipalink::test_support::{response_packet, tlv_bytes};
use vipalink::transport::{MockState, MockTransport};
use vipalink::types::DeviceIdentifier;

static INIT_LOGGING: Once = Once::new();

/// Route `log` output through env_logger once per test binary. RUST_LOG
/// controls verbosity as usual.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub const SERIAL: &str = "275-631-009";
pub const OTHER_SERIAL: &str = "275-640-362";
pub const PORT: &str = "mock0";

pub fn serial() -> DeviceIdentifier {
    DeviceIdentifier::from(SERIAL)
}

pub fn version_payload() -> Vec<u8> {
    let mut payload = tlv_bytes(0x50, b"VIPA 6.8.2.17");
    payload.extend(tlv_bytes(0x51, b"XPI 1.0"));
    payload
}

pub fn version_response() -> Vec<u8> {
    response_packet(0x01, 0x00, &version_payload(), true)
}

pub fn bundle_response() -> Vec<u8> {
    response_packet(0x01, 0x00, b"ADK=4.7.0;SEC=2.1", true)
}

pub fn ack_response() -> Vec<u8> {
    response_packet(0x01, 0x00, &[], true)
}

/// A chained response split across `middle + 1` packets; the caller gets the
/// per-packet chunks and the reassembled expectation.
pub fn chained_response_stream(middle: usize) -> (Vec<Vec<u8>>, Vec<u8>) {
    let mut chunks = Vec::with_capacity(middle + 1);
    for i in 0..middle {
        chunks.push(response_packet(0x01, 0x01, &[i as u8; 32], false));
    }
    chunks.push(response_packet(0x01, 0x00, &[0xEE; 16], true));

    let mut whole = Vec::new();
    for chunk in &chunks {
        whole.extend_from_slice(chunk);
    }
    (chunks, whole)
}

pub fn link_over_mock() -> (SerialLink, Arc<Mutex<MockState>>) {
    let (transport, handle) = MockTransport::new();
    (SerialLink::with_transport(PORT, Arc::new(transport)), handle)
}
