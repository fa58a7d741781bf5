#[path = "../common/mod.rs"]
mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use vipalink::link::ResponseHandlers;
use vipalink::protocol::frame::VipaCommand;
use vipalink::protocol::Tlv;
use vipalink::test_support::response_packet;
use vipalink::types::StatusWord;

fn oneshot_handlers<T: Send + 'static>(
    build: impl FnOnce(Arc<Mutex<Option<oneshot::Sender<T>>>>) -> ResponseHandlers,
) -> (ResponseHandlers, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    (build(Arc::new(Mutex::new(Some(tx)))), rx)
}

async fn recv<T>(rx: oneshot::Receiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx)
        .await
        .expect("response within two seconds")
        .expect("handler ran")
}

#[tokio::test]
async fn version_query_dispatches_tagged() {
    common::fixtures::init_logging();
    let (link, handle) = common::fixtures::link_over_mock();
    handle.lock().unwrap().set_responder(Box::new(|_| {
        vec![common::fixtures::version_response()]
    }));

    let (handlers, rx) = oneshot_handlers(|slot| ResponseHandlers {
        tagged: Some(Arc::new(move |elements: Vec<Tlv>, status: StatusWord| {
            assert!(status.is_success());
            if let Some(tx) = slot.lock().unwrap().take() {
                let _ = tx.send(elements);
            }
        })),
        tagless: Some(Arc::new(|_, _| panic!("payload is TLV, tagged must win"))),
        ..ResponseHandlers::default()
    });

    let cmd = VipaCommand::new(0xD2, 0x01, 0x00, 0x01)
        .with_data(b"mapp/version_info.html".to_vec());
    link.write_command(handlers, &cmd).await.expect("write");

    let elements = recv(rx).await;
    assert_eq!(elements[0].value, b"VIPA 6.8.2.17");
    assert_eq!(elements[1].value, b"XPI 1.0");
    link.close().await;
}

#[tokio::test]
async fn chained_reply_arrives_as_one_message() {
    common::fixtures::init_logging();
    let (link, handle) = common::fixtures::link_over_mock();
    let (chunks, _whole) = common::fixtures::chained_response_stream(4);
    handle
        .lock()
        .unwrap()
        .set_responder(Box::new(move |_| chunks.clone()));

    let (handlers, rx) = oneshot_handlers(|slot| ResponseHandlers {
        tagless: Some(Arc::new(move |data: Vec<u8>, _| {
            if let Some(tx) = slot.lock().unwrap().take() {
                let _ = tx.send(data);
            }
        })),
        ..ResponseHandlers::default()
    });

    // Reset expects a chained reply.
    let cmd = VipaCommand::new(0xD0, 0x00, 0x00, 0x01);
    link.write_command(handlers, &cmd).await.expect("write");

    let data = recv(rx).await;
    // 4 middle packets of 32 bytes plus the 16-byte tail.
    assert_eq!(data.len(), 4 * 32 + 16);
    assert_eq!(&data[..32], &[0u8; 32]);
    assert_eq!(&data[data.len() - 16..], &[0xEE; 16]);
    link.close().await;
}

#[tokio::test]
async fn contactless_message_routes_by_nad() {
    let (link, handle) = common::fixtures::link_over_mock();
    handle.lock().unwrap().set_responder(Box::new(|_| {
        vec![response_packet(0x02, 0x00, &[0xC1, 0xC2], true)]
    }));

    let (handlers, rx) = oneshot_handlers(|slot| ResponseHandlers {
        contactless: Some(Arc::new(move |data: Vec<u8>, _| {
            if let Some(tx) = slot.lock().unwrap().take() {
                let _ = tx.send(data);
            }
        })),
        tagless: Some(Arc::new(|_, _| panic!("NAD 0x02 must route contactless"))),
        ..ResponseHandlers::default()
    });

    let cmd = VipaCommand::new(0xD2, 0x01, 0x00, 0x01).with_data(b"mapp/pay.html".to_vec());
    link.write_command(handlers, &cmd).await.expect("write");

    assert_eq!(recv(rx).await, vec![0xC1, 0xC2]);
    link.close().await;
}
