#[path = "../common/mod.rs"]
mod common;

use vipalink::protocol::{FeedOutcome, ResponseAssembler};

#[test]
fn chained_stream_reassembles_in_order() {
    let (chunks, whole) = common::fixtures::chained_response_stream(5);
    let mut asm = ResponseAssembler::new();
    asm.begin_exchange(true);

    for chunk in &chunks[..chunks.len() - 1] {
        assert_eq!(asm.feed(chunk), FeedOutcome::Pending);
        assert!(asm.chained_in_progress());
        assert_eq!(asm.flush_idle(), None);
    }
    assert_eq!(
        asm.feed(&chunks[chunks.len() - 1]),
        FeedOutcome::Complete(whole)
    );
    assert!(asm.sanity_check());
}

#[test]
fn unchained_stream_waits_for_idle() {
    let mut asm = ResponseAssembler::new();
    asm.begin_exchange(false);

    let packet = common::fixtures::version_response();
    let (head, tail) = packet.split_at(packet.len() / 2);
    assert_eq!(asm.feed(head), FeedOutcome::Pending);
    assert_eq!(asm.feed(tail), FeedOutcome::Pending);
    assert_eq!(asm.flush_idle(), Some(packet));
}

#[test]
fn exchanges_are_independent() {
    let (chunks, _whole) = common::fixtures::chained_response_stream(2);
    let mut asm = ResponseAssembler::new();

    asm.begin_exchange(true);
    asm.feed(&chunks[0]);

    // A new exchange abandons the unfinished chain.
    asm.begin_exchange(false);
    assert!(!asm.chained_in_progress());
    let ack = common::fixtures::ack_response();
    asm.feed(&ack);
    assert_eq!(asm.flush_idle(), Some(ack));
}
