// vipalink-rs/vipalink/src/link/mod.rs

//! Serial link: packet writes, the background reader and response delivery.

pub mod dispatch;

pub use dispatch::{ParsedResponse, ResponseHandlers};

use crate::constants::{
    PORT_READ_CHAIN_POLL_MS, PORT_READ_CHUNK_TIMEOUT_MS, PORT_READ_IDLE_DELAY_MS,
    PORT_REOPEN_QUIESCENT_MS, RAW_READ_LEN,
};
use crate::protocol::chaining::{is_chained_response_command, requires_chaining, split_for_chaining};
use crate::protocol::frame::VipaCommand;
use crate::protocol::reassembly::{FeedOutcome, ResponseAssembler};
use crate::transport::Transport;
use crate::utils::hex::bytes_to_hex;
use crate::{Error, Result};
use log::{debug, trace, warn};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio_util::sync::CancellationToken;

struct LinkShared {
    transport: StdMutex<Option<Arc<dyn Transport>>>,
    write_lock: TokioMutex<()>,
    handlers: StdMutex<ResponseHandlers>,
    assembler: StdMutex<ResponseAssembler>,
    reader_active: StdMutex<bool>,
    cancel: CancellationToken,
    port_name: String,
}

/// One open connection to a terminal.
///
/// Cheap to clone; all clones share the port, the single write mutex, the
/// response assembler and the background reader.
#[derive(Clone)]
pub struct SerialLink {
    shared: Arc<LinkShared>,
}

impl SerialLink {
    /// Open the named serial port with factory line settings.
    #[cfg(feature = "serial")]
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_settings(&crate::transport::SerialSettings::for_port(port_name))
    }

    /// Open a port with explicit line settings.
    ///
    /// Fails fast: any driver rejection surfaces here, not on the first
    /// command. Stale bytes left in the OS buffers from a previous session
    /// are discarded before the link is handed out.
    #[cfg(feature = "serial")]
    pub fn open_with_settings(settings: &crate::transport::SerialSettings) -> Result<Self> {
        let transport = crate::transport::SerialTransport::open_with_settings(settings)?;
        Ok(Self::with_transport(
            &settings.port_name,
            Arc::new(transport),
        ))
    }

    /// Build a link over an already-open transport. Used by tests.
    pub fn with_transport(port_name: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            shared: Arc::new(LinkShared {
                transport: StdMutex::new(Some(transport)),
                write_lock: TokioMutex::new(()),
                handlers: StdMutex::new(ResponseHandlers::default()),
                assembler: StdMutex::new(ResponseAssembler::new()),
                reader_active: StdMutex::new(false),
                cancel: CancellationToken::new(),
                port_name: port_name.to_string(),
            }),
        }
    }

    /// Name of the port this link talks over.
    pub fn port_name(&self) -> &str {
        &self.shared.port_name
    }

    /// Whether the port is open and usable.
    pub fn is_connected(&self) -> bool {
        lock(&self.shared.transport)
            .as_ref()
            .is_some_and(|t| t.is_open())
    }

    /// Install the handler triple and send one command.
    ///
    /// The previous handlers are replaced wholesale and the assembler is
    /// armed for the command's expected response shape before the first
    /// packet goes out. Each packet write holds the link's single write
    /// mutex, so packets from concurrent callers never interleave.
    pub async fn write_command(
        &self,
        handlers: ResponseHandlers,
        command: &VipaCommand,
    ) -> Result<()> {
        let transport = lock(&self.shared.transport)
            .clone()
            .ok_or_else(|| Error::Connection("port is not open".to_string()))?;

        *lock(&self.shared.handlers) = handlers;
        lock(&self.shared.assembler).begin_exchange(is_chained_response_command(command));

        let packets = if requires_chaining(command) {
            split_for_chaining(command)?
        } else {
            vec![command.encode()?]
        };

        for packet in &packets {
            let _write_guard = self.shared.write_lock.lock().await;
            trace!(
                "LINK[{}]: TX [{}]",
                self.shared.port_name,
                bytes_to_hex(packet)
            );
            transport.write_all(packet).await?;
        }

        self.ensure_reader();
        Ok(())
    }

    /// Start the background reader if no instance is running.
    fn ensure_reader(&self) {
        let mut active = lock(&self.shared.reader_active);
        if *active {
            return;
        }
        *active = true;
        let shared = Arc::clone(&self.shared);
        tokio::spawn(read_loop(shared));
    }

    /// Close the link.
    ///
    /// Idempotent. Stops the reader, discards port buffers, closes the port
    /// and waits out the quiescent period the OS driver needs before the
    /// same port can be reopened.
    pub async fn close(&self) {
        let transport = lock(&self.shared.transport).take();
        self.shared.cancel.cancel();
        lock(&self.shared.assembler).reset();
        *lock(&self.shared.handlers) = ResponseHandlers::default();

        if let Some(transport) = transport {
            if let Err(e) = transport.discard_buffers().await {
                debug!("LINK[{}]: discard on close: {}", self.shared.port_name, e);
            }
            if let Err(e) = transport.close().await {
                warn!("LINK[{}]: close failed: {}", self.shared.port_name, e);
            }
            tokio::time::sleep(Duration::from_millis(PORT_REOPEN_QUIESCENT_MS)).await;
            debug!("LINK[{}]: closed", self.shared.port_name);
        }
    }
}

async fn read_loop(shared: Arc<LinkShared>) {
    debug!("LINK[{}]: reader started", shared.port_name);
    let mut buf = vec![0u8; RAW_READ_LEN];
    loop {
        if shared.cancel.is_cancelled() {
            break;
        }
        let transport = match lock(&shared.transport).clone() {
            Some(t) if t.is_open() => t,
            _ => break,
        };

        let pending = match transport.bytes_to_read().await {
            Ok(n) => n,
            Err(e) => {
                warn!("LINK[{}]: poll failed: {}", shared.port_name, e);
                break;
            }
        };

        if pending == 0 {
            let chained = lock(&shared.assembler).chained_in_progress();
            if !chained {
                let flushed = lock(&shared.assembler).flush_idle();
                if let Some(message) = flushed {
                    deliver(&shared, &message);
                }
            }
            let delay = if chained {
                PORT_READ_CHAIN_POLL_MS
            } else {
                PORT_READ_IDLE_DELAY_MS
            };
            tokio::select! {
                _ = shared.cancel.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
            }
            continue;
        }

        match transport
            .read_chunk(&mut buf, PORT_READ_CHUNK_TIMEOUT_MS)
            .await
        {
            Ok(0) => {}
            Ok(n) => {
                let outcome = lock(&shared.assembler).feed(&buf[..n]);
                if let FeedOutcome::Complete(message) = outcome {
                    deliver(&shared, &message);
                }
            }
            // An empty window between the poll and the read is idleness,
            // not a fault.
            Err(Error::Timeout) => {}
            Err(e) => {
                warn!("LINK[{}]: read failed: {}", shared.port_name, e);
                break;
            }
        }
    }
    *lock(&shared.reader_active) = false;
    debug!("LINK[{}]: reader stopped", shared.port_name);
}

/// Hand a completed message to the installed handlers.
///
/// Protocol faults stop here: a malformed or unroutable response is logged
/// and dropped, never unwound into the reader task.
fn deliver(shared: &Arc<LinkShared>, message: &[u8]) {
    trace!(
        "LINK[{}]: RX [{}]",
        shared.port_name,
        bytes_to_hex(message)
    );
    let handlers = lock(&shared.handlers).clone();
    match dispatch::parse_response(message) {
        Ok(parsed) => {
            if let Err(e) = dispatch::dispatch(&handlers, parsed) {
                warn!(
                    "LINK[{}]: response dropped: {}",
                    shared.port_name, e
                );
            }
        }
        Err(e) => {
            warn!(
                "LINK[{}]: malformed response dropped: {}",
                shared.port_name, e
            );
        }
    }
    lock(&shared.assembler).sanity_check();
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
