// vipalink-rs/vipalink/src/transport/serial.rs

//! Serial port backend built on `tokio-serial`.

use crate::{Error, Result};
use async_trait::async_trait;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_serial::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream,
    StopBits,
};

/// Baud rate the terminal ships configured for.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Port parameters for one terminal connection.
///
/// The defaults are the terminal's factory line settings; only `port_name`
/// normally needs filling in. Validation is left to `open()`, which fails
/// fast on anything the driver rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// OS name of the port, e.g. `/dev/ttyACM0` or `COM9`.
    pub port_name: String,
    /// Line speed.
    pub baud_rate: u32,
    /// Data bits per character.
    pub data_bits: DataBits,
    /// Parity scheme.
    pub parity: Parity,
    /// Stop bits per character.
    pub stop_bits: StopBits,
    /// Flow control scheme.
    pub flow_control: FlowControl,
    /// Driver-level read timeout in milliseconds.
    pub read_timeout_ms: u64,
}

impl SerialSettings {
    /// Factory line settings for the named port.
    pub fn for_port(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            read_timeout_ms: 100,
        }
    }
}

/// [`super::Transport`] over a local serial port.
pub struct SerialTransport {
    stream: Mutex<SerialStream>,
    open: AtomicBool,
    port_name: String,
}

impl SerialTransport {
    /// Open the named port with factory settings.
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_settings(&SerialSettings::for_port(port_name))
    }

    /// Open a port with explicit line settings.
    pub fn open_with_settings(settings: &SerialSettings) -> Result<Self> {
        let stream = tokio_serial::new(&settings.port_name, settings.baud_rate)
            .data_bits(settings.data_bits)
            .parity(settings.parity)
            .stop_bits(settings.stop_bits)
            .flow_control(settings.flow_control)
            .timeout(Duration::from_millis(settings.read_timeout_ms))
            .open_native_async()?;
        // Drop anything a previous session left in the OS buffers.
        stream.clear(ClearBuffer::All)?;
        debug!(
            "opened serial port {} at {} baud",
            settings.port_name, settings.baud_rate
        );
        Ok(Self {
            stream: Mutex::new(stream),
            open: AtomicBool::new(true),
            port_name: settings.port_name.clone(),
        })
    }

    /// Name of the underlying port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl super::Transport for SerialTransport {
    async fn write_all(&self, bytes: &[u8]) -> Result<()> {
        let mut stream = self.stream.lock().await;
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn read_chunk(&self, buf: &mut [u8], timeout_ms: u64) -> Result<usize> {
        let mut stream = self.stream.lock().await;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), stream.read(buf)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn bytes_to_read(&self) -> Result<usize> {
        let stream = self.stream.lock().await;
        Ok(stream.bytes_to_read()? as usize)
    }

    async fn discard_buffers(&self) -> Result<()> {
        let stream = self.stream.lock().await;
        stream.clear(ClearBuffer::All)?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        if self.open.swap(false, Ordering::SeqCst) {
            let stream = self.stream.lock().await;
            let _ = stream.clear(ClearBuffer::All);
            debug!("closed serial port {}", self.port_name);
        }
        Ok(())
    }
}
