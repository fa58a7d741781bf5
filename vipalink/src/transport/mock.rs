// vipalink-rs/vipalink/src/transport/mock.rs

//! In-memory transport for tests.

use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Closure that maps a written packet to the chunks the port will answer.
pub type Responder = Box<dyn Fn(&[u8]) -> Vec<Vec<u8>> + Send + Sync>;

/// Shared state behind a [`MockTransport`].
///
/// Tests keep a clone of the handle to script reads and inspect writes while
/// the link owns the transport as a trait object.
#[derive(Default)]
pub struct MockState {
    /// Every byte written, in order, across all writes.
    pub written: Vec<u8>,
    /// One entry per `write_all` call.
    pub writes: Vec<Vec<u8>>,
    /// Chunks the next reads will return, oldest first.
    pub to_read: VecDeque<Vec<u8>>,
    /// Cleared by `close`.
    pub open: bool,
    /// `discard_buffers` call count.
    pub discards: usize,
    responder: Option<Responder>,
}

impl MockState {
    /// Queue a chunk for a future read.
    pub fn push_read(&mut self, chunk: Vec<u8>) {
        self.to_read.push_back(chunk);
    }

    /// Answer every write through the closure.
    pub fn set_responder(&mut self, responder: Responder) {
        self.responder = Some(responder);
    }
}

/// A scripted [`super::Transport`].
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create an open mock and the handle used to script it.
    pub fn new() -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState {
            open: true,
            ..MockState::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl super::Transport for MockTransport {
    async fn write_all(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if !state.open {
            return Err(Error::Connection("mock port closed".to_string()));
        }
        state.written.extend_from_slice(bytes);
        state.writes.push(bytes.to_vec());
        if let Some(responder) = &state.responder {
            let chunks = responder(bytes);
            for chunk in chunks {
                state.to_read.push_back(chunk);
            }
        }
        Ok(())
    }

    async fn read_chunk(&self, buf: &mut [u8], _timeout_ms: u64) -> Result<usize> {
        let chunk = self.lock().to_read.pop_front();
        match chunk {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    // requeue the tail so short reads behave like a stream
                    self.lock().to_read.push_front(chunk[n..].to_vec());
                }
                Ok(n)
            }
            None => Err(Error::Timeout),
        }
    }

    async fn bytes_to_read(&self) -> Result<usize> {
        Ok(self.lock().to_read.iter().map(Vec::len).sum())
    }

    async fn discard_buffers(&self) -> Result<()> {
        let mut state = self.lock();
        state.to_read.clear();
        state.discards += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    async fn close(&self) -> Result<()> {
        self.lock().open = false;
        Ok(())
    }
}
