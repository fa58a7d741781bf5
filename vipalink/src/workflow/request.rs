// vipalink-rs/vipalink/src/workflow/request.rs

//! The request envelope a sub-workflow runs against, and what it records.

use crate::types::DeviceIdentifier;
use crate::Error;

/// One operation a caller can ask of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceAction {
    /// Restore the idle screen.
    DisplayIdleScreen,
    /// Turn the ADK logger on.
    EnableAdkLogger,
    /// Clear the ADK log store.
    AdkLoggerReset,
    /// Pull the terminal logs.
    GetTerminalLogs,
    /// Report firmware versions.
    ReportVipaVersions,
    /// Report the bundle inventory.
    ReportBundleVersions,
}

/// One action addressed to one terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkActionRequest {
    /// What to do.
    pub action: DeviceAction,
    /// Which terminal to do it on.
    pub device: DeviceIdentifier,
}

/// Why a recorded action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkflowErrorKind {
    /// No connected terminal matched the identifier.
    DeviceNotFound,
    /// The action ran out of time or the request was cancelled.
    TimeoutOrCancelled,
}

/// One failure recorded against a request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkflowError {
    /// Terminal the failing action addressed.
    pub device: DeviceIdentifier,
    /// Failure classification.
    pub kind: WorkflowErrorKind,
}

impl WorkflowError {
    /// View the recorded failure as the crate error.
    ///
    /// For callers that propagate with `?` instead of inspecting the
    /// request's error list.
    pub fn to_error(&self) -> Error {
        match self.kind {
            WorkflowErrorKind::DeviceNotFound => Error::DeviceNotFound(self.device.to_string()),
            WorkflowErrorKind::TimeoutOrCancelled => Error::TimeoutOrCancelled,
        }
    }
}

/// One successful action's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionResponse {
    /// Terminal that answered.
    pub device: DeviceIdentifier,
    /// Action that produced the payload.
    pub action: DeviceAction,
    /// Response bytes; empty for acknowledge-only actions.
    pub data: Vec<u8>,
}

/// A sub-workflow request and everything it accumulated while running.
///
/// The workflow never aborts mid-request: failures land in `errors`,
/// payloads in `responses`, and the machine always runs to completion.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkRequest {
    /// Caller-supplied correlation id, carried through all logging.
    pub message_id: String,
    /// Actions to run, in order.
    pub actions: Vec<LinkActionRequest>,
    /// Failures recorded while running.
    pub errors: Vec<WorkflowError>,
    /// Payloads recorded while running.
    pub responses: Vec<ActionResponse>,
}

impl LinkRequest {
    /// Build a request with no recorded results yet.
    pub fn new(message_id: impl Into<String>, actions: Vec<LinkActionRequest>) -> Self {
        Self {
            message_id: message_id.into(),
            actions,
            errors: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// Record one failure.
    pub fn record_error(&mut self, device: DeviceIdentifier, kind: WorkflowErrorKind) {
        self.errors.push(WorkflowError { device, kind });
    }

    /// Record one successful payload.
    pub fn record_response(
        &mut self,
        device: DeviceIdentifier,
        action: DeviceAction,
        data: Vec<u8>,
    ) {
        self.responses.push(ActionResponse {
            device,
            action,
            data,
        });
    }

    /// Whether any failure was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
