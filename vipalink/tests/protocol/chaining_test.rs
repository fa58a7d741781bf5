use vipalink::constants::PCB_CHAIN_BIT;
use vipalink::protocol::frame::{validate_received, VipaCommand};
use vipalink::protocol::{is_chained_response_command, requires_chaining, split_for_chaining};

fn signature_command(data_len: usize) -> VipaCommand {
    let mut data = b"mapp/signature.html?payload=".to_vec();
    data.resize(data_len, 0x41);
    VipaCommand::new(0xD2, 0x01, 0x00, 0x01).with_data(data)
}

#[test]
fn large_signature_page_is_chained_both_ways() {
    let cmd = signature_command(800);
    assert!(requires_chaining(&cmd));
    assert!(is_chained_response_command(&cmd));
}

#[test]
fn split_packets_reconstruct_the_command() {
    let cmd = signature_command(800);
    let packets = split_for_chaining(&cmd).expect("split");

    let mut rebuilt = Vec::new();
    for (i, packet) in packets.iter().enumerate() {
        let decoded = validate_received(packet).expect("each packet validates");
        let last = i == packets.len() - 1;
        assert_eq!(
            decoded.pcb & PCB_CHAIN_BIT != 0,
            !last,
            "continuation bit on packet {}",
            i
        );
        let skip = if i == 0 { 5 } else { 0 }; // CLA INS P1 P2 Lc
        rebuilt.extend_from_slice(&decoded.payload[skip..]);
    }
    assert_eq!(Some(rebuilt), cmd.data);
}

#[test]
fn first_packet_is_the_full_fixed_size() {
    let packets = split_for_chaining(&signature_command(800)).expect("split");
    assert_eq!(packets[0].len(), 3 + 0xFE + 1);
    assert_eq!(packets[0][2], 0xFE);
    assert_eq!(packets[0][7], 0xFF);
}
