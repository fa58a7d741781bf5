#[path = "../common/mod.rs"]
mod common;

use vipalink::link::ResponseHandlers;
use vipalink::protocol::frame::{validate_received, VipaCommand};

fn marked_command(fill: u8) -> VipaCommand {
    // Large enough to split into several chained packets.
    VipaCommand::new(0xD2, 0x01, 0x00, 0x01).with_data(vec![fill; 700])
}

#[tokio::test]
async fn concurrent_writers_never_interleave_packet_bytes() {
    common::fixtures::init_logging();
    let (link, handle) = common::fixtures::link_over_mock();

    let mut joins = Vec::new();
    for fill in [0x11u8, 0x22, 0x33, 0x44] {
        let link = link.clone();
        joins.push(tokio::spawn(async move {
            link.write_command(ResponseHandlers::default(), &marked_command(fill))
                .await
        }));
    }
    for join in joins {
        join.await.expect("task").expect("write");
    }

    // Walk the flat byte stream the port saw. Whole packets from different
    // writers may alternate, but every packet must parse in place and carry
    // the fill of exactly one writer.
    let written = handle.lock().unwrap().written.clone();
    let mut i = 0usize;
    let mut packets = 0usize;
    while i < written.len() {
        assert!(written.len() - i >= 4, "stray bytes at offset {}", i);
        let len = written[i + 2] as usize;
        let end = i + 3 + len + 1;
        assert!(end <= written.len(), "truncated packet at offset {}", i);
        let packet = validate_received(&written[i..end]).expect("contiguous valid packet");

        // First packets of a chain open with CLA INS P1 P2 Lc; the rest is
        // the writer's fill either way.
        let body = if packet.payload.len() >= 5 && packet.payload[..4] == [0xD2, 0x01, 0x00, 0x01]
        {
            &packet.payload[5..]
        } else {
            &packet.payload[..]
        };
        let first = body.first().expect("non-empty packet body");
        assert!(
            body.iter().all(|b| b == first),
            "mixed fills inside one packet at offset {}",
            i
        );

        i = end;
        packets += 1;
    }
    // 700 data bytes split into 3 packets per writer.
    assert_eq!(packets, 12);
    link.close().await;
}
