// vipalink-rs/vipalink/src/workflow/controller.rs

//! Drives a [`LinkRequest`] through the sub-workflow state machine.

use crate::constants::DEVICE_ACTION_TIMEOUT_MS;
use crate::device::TerminalDevice;
use crate::types::DeviceIdentifier;
use crate::workflow::cancellation::{CancellationBroker, ExecutionOutcome};
use crate::workflow::request::{DeviceAction, LinkRequest, WorkflowErrorKind};
use crate::workflow::state::{self, SubWorkflowState};
use crate::{Error, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs device sub-workflow requests over a fixed set of connected devices.
pub struct SubWorkflowController {
    devices: Vec<Arc<dyn TerminalDevice>>,
    broker: CancellationBroker,
    action_timeout: Duration,
    cancel: CancellationToken,
}

impl SubWorkflowController {
    /// Build a controller over the connected devices.
    pub fn new(devices: Vec<Arc<dyn TerminalDevice>>) -> Self {
        Self {
            devices,
            broker: CancellationBroker,
            action_timeout: Duration::from_millis(DEVICE_ACTION_TIMEOUT_MS),
            cancel: CancellationToken::new(),
        }
    }

    /// Override the per-action timeout.
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Token that cancels every in-flight and future action when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the request through the machine to `RequestComplete`.
    ///
    /// Per-action failures are recorded on the request, never returned: the
    /// machine reaches `RequestComplete` whether or not anything went wrong.
    /// Only a request with no actions fails outright, before the machine
    /// starts.
    pub async fn execute(&self, request: &mut LinkRequest) -> Result<()> {
        let first = request.actions.first().cloned().ok_or_else(|| {
            Error::InvalidStateTransition("request carries no actions".to_string())
        })?;

        let mut current = state::initial_state_for(&first.action);
        info!(
            "WORKFLOW[{}]: starting in {} with {} action(s)",
            request.message_id,
            current,
            request.actions.len()
        );

        loop {
            debug!("WORKFLOW[{}]: state {}", request.message_id, current);
            match current {
                SubWorkflowState::Undefined => {
                    return Err(Error::InvalidStateTransition(
                        "machine advanced from rest".to_string(),
                    ));
                }
                SubWorkflowState::SanityCheck => {
                    self.run_sanity_check(request).await;
                }
                SubWorkflowState::RequestComplete => {
                    info!(
                        "WORKFLOW[{}]: complete with {} response(s), {} error(s)",
                        request.message_id,
                        request.responses.len(),
                        request.errors.len()
                    );
                    // Park the machine.
                    state::get_next_state(current, request.has_errors())?;
                    return Ok(());
                }
                operational => {
                    self.run_operational_state(operational, request).await;
                }
            }
            current = state::get_next_state(current, request.has_errors())?;
        }
    }

    /// Run every action the current state covers.
    async fn run_operational_state(&self, current: SubWorkflowState, request: &mut LinkRequest) {
        let actions = request.actions.clone();
        for entry in actions {
            if state::initial_state_for(&entry.action) != current {
                continue;
            }
            let Some(device) = self.find_device(&entry.device) else {
                warn!(
                    "WORKFLOW[{}]: {}",
                    request.message_id,
                    Error::DeviceNotFound(entry.device.to_string())
                );
                request.record_error(entry.device.clone(), WorkflowErrorKind::DeviceNotFound);
                continue;
            };

            let work = run_action(device, entry.action);
            match self
                .broker
                .execute_with_timeout(work, self.action_timeout, &self.cancel)
                .await
            {
                ExecutionOutcome::Success(data) => {
                    request.record_response(entry.device.clone(), entry.action, data);
                }
                ExecutionOutcome::Failure => {
                    warn!(
                        "WORKFLOW[{}]: {:?} on SN='{}': {}",
                        request.message_id,
                        entry.action,
                        entry.device,
                        Error::TimeoutOrCancelled
                    );
                    request.record_error(
                        entry.device.clone(),
                        WorkflowErrorKind::TimeoutOrCancelled,
                    );
                }
            }
        }
    }

    /// Ping every device the request referenced.
    async fn run_sanity_check(&self, request: &LinkRequest) {
        let mut seen: Vec<&DeviceIdentifier> = Vec::new();
        for entry in &request.actions {
            if seen.contains(&&entry.device) {
                continue;
            }
            seen.push(&entry.device);
            let Some(device) = self.find_device(&entry.device) else {
                continue;
            };
            match device.sanity_check().await {
                Ok(true) => {
                    debug!(
                        "WORKFLOW[{}]: sanity check passed for SN='{}'",
                        request.message_id, entry.device
                    );
                }
                Ok(false) => {
                    warn!(
                        "WORKFLOW[{}]: sanity check failed for SN='{}'",
                        request.message_id, entry.device
                    );
                }
                Err(e) => {
                    warn!(
                        "WORKFLOW[{}]: sanity check errored for SN='{}': {}",
                        request.message_id, entry.device, e
                    );
                }
            }
        }
    }

    fn find_device(&self, id: &DeviceIdentifier) -> Option<Arc<dyn TerminalDevice>> {
        self.devices
            .iter()
            .find(|d| &d.information().serial_number == id)
            .cloned()
    }
}

/// Map one action onto its device operation, normalized to a byte payload.
async fn run_action(device: Arc<dyn TerminalDevice>, action: DeviceAction) -> Result<Vec<u8>> {
    match action {
        DeviceAction::DisplayIdleScreen => {
            device.display_idle_screen().await?;
            Ok(Vec::new())
        }
        DeviceAction::EnableAdkLogger => {
            device.enable_adk_logger().await?;
            Ok(Vec::new())
        }
        DeviceAction::AdkLoggerReset => {
            device.adk_logger_reset().await?;
            Ok(Vec::new())
        }
        DeviceAction::GetTerminalLogs => device.get_terminal_logs().await,
        DeviceAction::ReportVipaVersions => device.report_vipa_versions().await,
        DeviceAction::ReportBundleVersions => device.report_bundle_versions().await,
    }
}
