// vipalink-rs/vipalink/src/device/mod.rs

//! Terminal device operations on top of an open [`SerialLink`].

use crate::link::dispatch::ResponseHandlers;
use crate::link::SerialLink;
use crate::protocol::frame::VipaCommand;
use crate::protocol::tlv::Tlv;
use crate::types::{DeviceIdentifier, StatusWord, VipaCommandType};
use crate::{Error, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::oneshot;

/// HTML page shown while the terminal waits for a customer.
pub const IDLE_SCREEN_PAGE: &str = "mapp/idle_screen.html";
/// HTML page that makes the terminal print its firmware versions.
pub const VERSION_INFO_PAGE: &str = "mapp/version_info.html";
/// HTML page that makes the terminal print its bundle inventory.
pub const BUNDLE_INFO_PAGE: &str = "mapp/bundle_info.html";

/// Identity of one connected terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInformation {
    /// Manufacturer serial number.
    pub serial_number: DeviceIdentifier,
    /// Port the terminal is attached to.
    pub port_name: String,
}

/// Payload of a delivered response, as the dispatcher classified it.
#[derive(Debug, Clone)]
pub enum DeviceReply {
    /// BER-TLV payload.
    Tagged(Vec<Tlv>),
    /// Raw payload.
    Plain(Vec<u8>),
}

impl DeviceReply {
    /// Flatten to raw bytes; tagged replies concatenate their values.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            DeviceReply::Plain(bytes) => bytes,
            DeviceReply::Tagged(elements) => {
                elements.into_iter().flat_map(|t| t.value).collect()
            }
        }
    }
}

/// The operations a workflow runs against one terminal.
#[async_trait]
pub trait TerminalDevice: Send + Sync {
    /// Identity of this terminal.
    fn information(&self) -> DeviceInformation;

    /// Put the idle screen back up.
    async fn display_idle_screen(&self) -> Result<()>;

    /// Turn the on-terminal ADK logger on.
    async fn enable_adk_logger(&self) -> Result<()>;

    /// Clear the on-terminal ADK log store.
    async fn adk_logger_reset(&self) -> Result<()>;

    /// Pull the accumulated terminal logs.
    async fn get_terminal_logs(&self) -> Result<Vec<u8>>;

    /// Report the firmware component versions.
    async fn report_vipa_versions(&self) -> Result<Vec<u8>>;

    /// Report the installed bundle inventory.
    async fn report_bundle_versions(&self) -> Result<Vec<u8>>;

    /// Cheap liveness probe between operations.
    async fn sanity_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// [`TerminalDevice`] implementation speaking the VIPA protocol.
pub struct VipaDevice {
    link: SerialLink,
    serial_number: DeviceIdentifier,
}

impl VipaDevice {
    /// Bind a device identity to an open link.
    pub fn new(link: SerialLink, serial_number: DeviceIdentifier) -> Self {
        Self {
            link,
            serial_number,
        }
    }

    /// One request/response exchange.
    ///
    /// Installs a handler triple that forwards whichever classification the
    /// dispatcher picks into a oneshot, writes the command, awaits the
    /// reply. The await is unbounded here; callers run under the workflow
    /// broker, which owns the timeout.
    async fn exchange(&self, command: VipaCommand) -> Result<(DeviceReply, StatusWord)> {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(StdMutex::new(Some(tx)));

        let tagged_tx = Arc::clone(&tx);
        let tagless_tx = Arc::clone(&tx);
        let handlers = ResponseHandlers {
            tagged: Some(Arc::new(move |elements, status| {
                if let Ok(mut slot) = tagged_tx.lock() {
                    if let Some(tx) = slot.take() {
                        let _ = tx.send((DeviceReply::Tagged(elements), status));
                    }
                }
            })),
            tagless: Some(Arc::new(move |data, status| {
                if let Ok(mut slot) = tagless_tx.lock() {
                    if let Some(tx) = slot.take() {
                        let _ = tx.send((DeviceReply::Plain(data), status));
                    }
                }
            })),
            contactless: None,
        };

        self.link.write_command(handlers, &command).await?;
        let (reply, status) = rx
            .await
            .map_err(|_| Error::Connection("link closed before the response arrived".to_string()))?;
        if !status.is_success() {
            warn!(
                "DEVICE[{}]: status {:04X} from CLA/INS {:02X}/{:02X}",
                self.link.port_name(),
                status.as_u16(),
                command.cla,
                command.ins
            );
        }
        Ok((reply, status))
    }

    async fn display_page(&self, page: &str) -> Result<()> {
        let (cla, ins) = VipaCommandType::DisplayHtml.class_ins();
        let command = VipaCommand::new(cla, ins, 0x00, 0x01).with_data(page.as_bytes().to_vec());
        self.exchange(command).await?;
        Ok(())
    }
}

#[async_trait]
impl TerminalDevice for VipaDevice {
    fn information(&self) -> DeviceInformation {
        DeviceInformation {
            serial_number: self.serial_number.clone(),
            port_name: self.link.port_name().to_string(),
        }
    }

    async fn display_idle_screen(&self) -> Result<()> {
        info!(
            "DEVICE[{}]: DISPLAY IDLE SCREEN for SN='{}'",
            self.link.port_name(),
            self.serial_number
        );
        self.display_page(IDLE_SCREEN_PAGE).await
    }

    async fn enable_adk_logger(&self) -> Result<()> {
        info!(
            "DEVICE[{}]: ENABLE ADK LOGGER for SN='{}'",
            self.link.port_name(),
            self.serial_number
        );
        let (cla, ins) = VipaCommandType::ConfigureLogging.class_ins();
        self.exchange(VipaCommand::new(cla, ins, 0x01, 0x00)).await?;
        Ok(())
    }

    async fn adk_logger_reset(&self) -> Result<()> {
        info!(
            "DEVICE[{}]: ADK LOGGER RESET for SN='{}'",
            self.link.port_name(),
            self.serial_number
        );
        let (cla, ins) = VipaCommandType::ConfigureLogging.class_ins();
        self.exchange(VipaCommand::new(cla, ins, 0x02, 0x00)).await?;
        Ok(())
    }

    async fn get_terminal_logs(&self) -> Result<Vec<u8>> {
        info!(
            "DEVICE[{}]: GET TERMINAL LOGS for SN='{}'",
            self.link.port_name(),
            self.serial_number
        );
        let (cla, ins) = VipaCommandType::GetTerminalLogs.class_ins();
        let (reply, _status) = self
            .exchange(VipaCommand::new(cla, ins, 0x00, 0x00).with_le(0x00))
            .await?;
        Ok(reply.into_bytes())
    }

    async fn report_vipa_versions(&self) -> Result<Vec<u8>> {
        info!(
            "DEVICE[{}]: REPORT VIPA VERSIONS for SN='{}'",
            self.link.port_name(),
            self.serial_number
        );
        let (cla, ins) = VipaCommandType::DisplayHtml.class_ins();
        let command = VipaCommand::new(cla, ins, 0x00, 0x01)
            .with_data(VERSION_INFO_PAGE.as_bytes().to_vec());
        let (reply, _status) = self.exchange(command).await?;
        Ok(reply.into_bytes())
    }

    async fn report_bundle_versions(&self) -> Result<Vec<u8>> {
        info!(
            "DEVICE[{}]: REPORT BUNDLE VERSIONS for SN='{}'",
            self.link.port_name(),
            self.serial_number
        );
        let (cla, ins) = VipaCommandType::DisplayHtml.class_ins();
        let command = VipaCommand::new(cla, ins, 0x00, 0x01)
            .with_data(BUNDLE_INFO_PAGE.as_bytes().to_vec());
        let (reply, _status) = self.exchange(command).await?;
        Ok(reply.into_bytes())
    }

    async fn sanity_check(&self) -> Result<bool> {
        Ok(self.link.is_connected())
    }
}
