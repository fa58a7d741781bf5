// vipalink-rs/vipalink/src/prelude.rs

//! Convenience re-exports.
//!
//! ```
//! use vipalink::prelude::*;
//! ```

pub use crate::device::{DeviceInformation, TerminalDevice, VipaDevice};
pub use crate::error::{Error, Result};
pub use crate::link::{ResponseHandlers, SerialLink};
pub use crate::protocol::frame::VipaCommand;
pub use crate::types::{DeviceIdentifier, StatusWord, VipaCommandType};
pub use crate::workflow::{
    ActionResponse, DeviceAction, LinkActionRequest, LinkRequest, SubWorkflowController,
    SubWorkflowState, WorkflowError, WorkflowErrorKind,
};
