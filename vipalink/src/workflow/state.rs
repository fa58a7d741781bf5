// vipalink-rs/vipalink/src/workflow/state.rs

//! The sub-workflow state machine.
//!
//! Every operational state funnels into `SanityCheck`, then
//! `RequestComplete`, then back to `Undefined`; the exception flag changes
//! what gets recorded, never the path taken. Errors surface in the request's
//! error list, not as alternate routes.

use crate::workflow::request::DeviceAction;
use crate::{Error, Result};
use std::fmt;

/// States a device sub-workflow moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubWorkflowState {
    /// No workflow in progress.
    Undefined,
    /// Restoring the idle screen.
    DisplayIdleScreen,
    /// Turning the ADK logger on.
    EnableAdkLogger,
    /// Clearing the ADK log store.
    AdkLoggerReset,
    /// Pulling terminal logs.
    GetTerminalLogs,
    /// Reporting firmware versions.
    ReportVipaVersions,
    /// Reporting the bundle inventory.
    ReportBundleVersions,
    /// Post-operation link verification.
    SanityCheck,
    /// Terminal state before the machine rests.
    RequestComplete,
}

impl fmt::Display for SubWorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubWorkflowState::Undefined => "Undefined",
            SubWorkflowState::DisplayIdleScreen => "DisplayIdleScreen",
            SubWorkflowState::EnableAdkLogger => "EnableADKLogger",
            SubWorkflowState::AdkLoggerReset => "ADKLoggerReset",
            SubWorkflowState::GetTerminalLogs => "GetTerminalLogs",
            SubWorkflowState::ReportVipaVersions => "ReportVIPAVersions",
            SubWorkflowState::ReportBundleVersions => "ReportBundleVersions",
            SubWorkflowState::SanityCheck => "SanityCheck",
            SubWorkflowState::RequestComplete => "RequestComplete",
        };
        f.write_str(name)
    }
}

/// Operational state that runs the given action.
pub fn initial_state_for(action: &DeviceAction) -> SubWorkflowState {
    match action {
        DeviceAction::DisplayIdleScreen => SubWorkflowState::DisplayIdleScreen,
        DeviceAction::EnableAdkLogger => SubWorkflowState::EnableAdkLogger,
        DeviceAction::AdkLoggerReset => SubWorkflowState::AdkLoggerReset,
        DeviceAction::GetTerminalLogs => SubWorkflowState::GetTerminalLogs,
        DeviceAction::ReportVipaVersions => SubWorkflowState::ReportVipaVersions,
        DeviceAction::ReportBundleVersions => SubWorkflowState::ReportBundleVersions,
    }
}

/// Compute the successor of `current`.
///
/// Total over every state except `Undefined`, which has no successor: a
/// machine asked to advance from rest is a caller bug and reports
/// [`Error::InvalidStateTransition`].
pub fn get_next_state(current: SubWorkflowState, exception: bool) -> Result<SubWorkflowState> {
    match current {
        SubWorkflowState::Undefined => Err(Error::InvalidStateTransition(format!(
            "no transition out of {}",
            current
        ))),
        SubWorkflowState::DisplayIdleScreen => Ok(display_idle_screen_next(exception)),
        SubWorkflowState::EnableAdkLogger => Ok(enable_adk_logger_next(exception)),
        SubWorkflowState::AdkLoggerReset => Ok(adk_logger_reset_next(exception)),
        SubWorkflowState::GetTerminalLogs => Ok(get_terminal_logs_next(exception)),
        SubWorkflowState::ReportVipaVersions => Ok(report_vipa_versions_next(exception)),
        // Shares the versions-report successor on purpose; both reports
        // finish the same way.
        SubWorkflowState::ReportBundleVersions => Ok(report_vipa_versions_next(exception)),
        SubWorkflowState::SanityCheck => Ok(sanity_check_next(exception)),
        SubWorkflowState::RequestComplete => Ok(request_complete_next(exception)),
    }
}

fn display_idle_screen_next(_exception: bool) -> SubWorkflowState {
    SubWorkflowState::SanityCheck
}

fn enable_adk_logger_next(_exception: bool) -> SubWorkflowState {
    SubWorkflowState::SanityCheck
}

fn adk_logger_reset_next(_exception: bool) -> SubWorkflowState {
    SubWorkflowState::SanityCheck
}

fn get_terminal_logs_next(_exception: bool) -> SubWorkflowState {
    SubWorkflowState::SanityCheck
}

fn report_vipa_versions_next(_exception: bool) -> SubWorkflowState {
    SubWorkflowState::SanityCheck
}

fn sanity_check_next(_exception: bool) -> SubWorkflowState {
    SubWorkflowState::RequestComplete
}

fn request_complete_next(_exception: bool) -> SubWorkflowState {
    SubWorkflowState::Undefined
}
