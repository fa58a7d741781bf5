// vipalink-rs/vipalink/src/workflow/mod.rs

//! Device sub-workflow: request model, state machine, cancellation broker
//! and the controller that drives a request through to completion.

pub mod cancellation;
pub mod controller;
pub mod request;
pub mod state;

pub use cancellation::{CancellationBroker, ExecutionOutcome};
pub use controller::SubWorkflowController;
pub use request::{
    ActionResponse, DeviceAction, LinkActionRequest, LinkRequest, WorkflowError, WorkflowErrorKind,
};
pub use state::SubWorkflowState;
