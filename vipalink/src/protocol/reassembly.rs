// vipalink-rs/vipalink/src/protocol/reassembly.rs

//! Accumulation of response bytes into complete messages.
//!
//! The terminal answers most commands with a single packet, delivered to the
//! caller once the port goes quiet ([`ResponseAssembler::flush_idle`]). A
//! handful of commands answer with a chained sequence instead; those complete
//! through the trailer rule in [`ResponseAssembler::feed`]: the chunk ends
//! with `0x90 0x00` ahead of the LRC and its continuation bit is clear.

use crate::constants::{
    CHAINED_RESPONSE_BUFFER_LEN, PCB_CHAIN_BIT, SW1_SUCCESS, SW2_SUCCESS,
    UNCHAINED_RESPONSE_BUFFER_LEN,
};
use crate::utils::hex::bytes_to_hex;
use log::{trace, warn};

/// Result of feeding one chunk of port bytes to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// A full response message; the accumulated bytes are handed over.
    Complete(Vec<u8>),
    /// More chunks are needed.
    Pending,
}

/// Accumulates raw chunks read from the port into response messages.
///
/// One exchange at a time: [`ResponseAssembler::begin_exchange`] arms the
/// assembler for the next command before its packets go out, so a chained
/// reply is never misread as a series of standalone messages.
#[derive(Debug)]
pub struct ResponseAssembler {
    buffer: Vec<u8>,
    chained_expected: bool,
    chained_in_progress: bool,
}

impl Default for ResponseAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseAssembler {
    /// Create an idle assembler with the unchained accumulation capacity.
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(UNCHAINED_RESPONSE_BUFFER_LEN),
            chained_expected: false,
            chained_in_progress: false,
        }
    }

    /// Arm the assembler for the next exchange.
    ///
    /// Any residual bytes from the previous exchange are dropped; the link
    /// reports them through [`ResponseAssembler::sanity_check`] before this
    /// is called.
    pub fn begin_exchange(&mut self, chained_response_expected: bool) {
        self.buffer.clear();
        self.chained_expected = chained_response_expected;
        self.chained_in_progress = false;
    }

    /// Whether a chained transfer is mid-flight.
    ///
    /// The reader polls tightly instead of idling while this holds.
    pub fn chained_in_progress(&self) -> bool {
        self.chained_in_progress
    }

    /// Feed one chunk read from the port.
    pub fn feed(&mut self, chunk: &[u8]) -> FeedOutcome {
        if chunk.is_empty() {
            return FeedOutcome::Pending;
        }
        trace!("RX chunk [{}]", bytes_to_hex(chunk));

        // The heuristic on the outgoing command is a prediction, not the
        // last word: the first chunk's continuation bit can still announce
        // a chained reply.
        if !self.chained_expected
            && self.buffer.is_empty()
            && chunk.len() >= 2
            && chunk[1] & PCB_CHAIN_BIT != 0
        {
            self.chained_expected = true;
        }

        if !self.chained_expected {
            self.buffer.extend_from_slice(chunk);
            return FeedOutcome::Pending;
        }

        let continuation = chunk.len() >= 2 && chunk[1] & PCB_CHAIN_BIT != 0;
        let success_trailer = chunk.len() >= 3
            && chunk[chunk.len() - 3] == SW1_SUCCESS
            && chunk[chunk.len() - 2] == SW2_SUCCESS;

        if success_trailer && !continuation {
            self.buffer.extend_from_slice(chunk);
            self.chained_in_progress = false;
            return FeedOutcome::Complete(self.take_buffer());
        }

        // Continuation bit set but the packet already carries the success
        // trailer: an unsolicited message that merely looks chained.
        // Deliver it standalone so the real chain stays intact.
        if success_trailer && continuation && self.buffer.is_empty() {
            return FeedOutcome::Complete(chunk.to_vec());
        }

        if continuation && !self.chained_in_progress {
            self.chained_in_progress = true;
            self.buffer.reserve(CHAINED_RESPONSE_BUFFER_LEN);
        }
        self.buffer.extend_from_slice(chunk);
        FeedOutcome::Pending
    }

    /// Complete an unchained response once the port reports nothing to read.
    ///
    /// Returns `None` while a chained transfer is still expected to produce
    /// more packets, or when nothing has accumulated.
    pub fn flush_idle(&mut self) -> Option<Vec<u8>> {
        if self.chained_in_progress || self.buffer.is_empty() {
            return None;
        }
        Some(self.take_buffer())
    }

    /// Post-delivery link-health check.
    ///
    /// Residual bytes after a delivered response mean the link and the
    /// terminal disagree about message boundaries; they are logged and
    /// discarded. Returns `true` when the assembler is clean.
    pub fn sanity_check(&mut self) -> bool {
        if self.buffer.is_empty() {
            return true;
        }
        warn!(
            "{} residual byte(s) after response delivery [{}]",
            self.buffer.len(),
            bytes_to_hex(&self.buffer)
        );
        self.buffer.clear();
        false
    }

    /// Drop all session state. Used when the link closes mid-exchange.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.chained_expected = false;
        self.chained_in_progress = false;
    }

    fn take_buffer(&mut self) -> Vec<u8> {
        std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(UNCHAINED_RESPONSE_BUFFER_LEN),
        )
    }
}
