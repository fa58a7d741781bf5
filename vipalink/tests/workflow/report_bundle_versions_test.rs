#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;
use vipalink::device::{TerminalDevice, VipaDevice};
use vipalink::types::DeviceIdentifier;
use vipalink::workflow::{
    DeviceAction, LinkActionRequest, LinkRequest, SubWorkflowController, WorkflowErrorKind,
};

fn request_for(serial: &str) -> LinkRequest {
    LinkRequest::new(
        "msg-42",
        vec![LinkActionRequest {
            action: DeviceAction::ReportBundleVersions,
            device: DeviceIdentifier::from(serial),
        }],
    )
}

#[tokio::test]
async fn report_bundle_versions_end_to_end() {
    common::fixtures::init_logging();
    let (link, handle) = common::fixtures::link_over_mock();
    handle.lock().unwrap().set_responder(Box::new(|_| {
        vec![common::fixtures::bundle_response()]
    }));
    let device: Arc<dyn TerminalDevice> =
        Arc::new(VipaDevice::new(link.clone(), common::fixtures::serial()));

    let controller = SubWorkflowController::new(vec![device]);
    let mut request = request_for(common::fixtures::SERIAL);
    controller.execute(&mut request).await.expect("workflow runs");

    assert!(request.errors.is_empty(), "errors: {:?}", request.errors);
    assert_eq!(request.responses.len(), 1);
    assert_eq!(request.responses[0].action, DeviceAction::ReportBundleVersions);
    assert_eq!(request.responses[0].data, b"ADK=4.7.0;SEC=2.1");
    link.close().await;
}

#[tokio::test]
async fn unknown_device_is_recorded_and_workflow_completes() {
    let (link, _handle) = common::fixtures::link_over_mock();
    let device: Arc<dyn TerminalDevice> =
        Arc::new(VipaDevice::new(link.clone(), common::fixtures::serial()));

    let controller = SubWorkflowController::new(vec![device]);
    let mut request = request_for(common::fixtures::OTHER_SERIAL);
    controller.execute(&mut request).await.expect("workflow runs");

    assert_eq!(request.errors.len(), 1);
    assert_eq!(request.errors[0].kind, WorkflowErrorKind::DeviceNotFound);
    assert_eq!(
        request.errors[0].device,
        DeviceIdentifier::from(common::fixtures::OTHER_SERIAL)
    );
    assert!(request.responses.is_empty());
    link.close().await;
}

#[tokio::test]
async fn silent_terminal_times_out_and_workflow_completes() {
    // No responder installed: the terminal never answers.
    let (link, _handle) = common::fixtures::link_over_mock();
    let device: Arc<dyn TerminalDevice> =
        Arc::new(VipaDevice::new(link.clone(), common::fixtures::serial()));

    let controller = SubWorkflowController::new(vec![device])
        .with_action_timeout(Duration::from_millis(50));
    let mut request = request_for(common::fixtures::SERIAL);
    controller.execute(&mut request).await.expect("workflow runs");

    assert_eq!(request.errors.len(), 1);
    assert_eq!(
        request.errors[0].kind,
        WorkflowErrorKind::TimeoutOrCancelled
    );
    assert!(request.responses.is_empty());
    link.close().await;
}
