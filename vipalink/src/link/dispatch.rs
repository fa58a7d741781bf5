// vipalink-rs/vipalink/src/link/dispatch.rs

//! Classification and delivery of completed response messages.

use crate::constants::NAD_CONTACTLESS;
use crate::protocol::frame::validate_received;
use crate::protocol::tlv::{self, Tlv};
use crate::types::StatusWord;
use crate::{Error, Result};
use std::sync::Arc;

/// Callback for responses whose payload parses as BER-TLV.
pub type TaggedHandler = Arc<dyn Fn(Vec<Tlv>, StatusWord) + Send + Sync>;
/// Callback for plain-byte responses.
pub type TaglessHandler = Arc<dyn Fn(Vec<u8>, StatusWord) + Send + Sync>;
/// Callback for messages from the contactless reader module.
pub type ContactlessHandler = Arc<dyn Fn(Vec<u8>, StatusWord) + Send + Sync>;

/// The handler triple installed per command.
///
/// Installing a new triple replaces the previous one wholesale; handlers are
/// never merged across commands.
#[derive(Clone, Default)]
pub struct ResponseHandlers {
    /// Receives TLV-decoded payloads.
    pub tagged: Option<TaggedHandler>,
    /// Receives raw payloads.
    pub tagless: Option<TaglessHandler>,
    /// Receives contactless-sourced payloads.
    pub contactless: Option<ContactlessHandler>,
}

impl std::fmt::Debug for ResponseHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHandlers")
            .field("tagged", &self.tagged.is_some())
            .field("tagless", &self.tagless.is_some())
            .field("contactless", &self.contactless.is_some())
            .finish()
    }
}

/// A response message reduced to its addressing, payload and status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// NAD of the first packet; identifies the sourcing module.
    pub nad: u8,
    /// Concatenated data bytes of every packet, status word stripped.
    pub data: Vec<u8>,
    /// Trailing SW1/SW2 pair.
    pub status: StatusWord,
}

/// Parse a delivered message buffer into a [`ParsedResponse`].
///
/// The buffer holds one packet or, for a chained response, several packets
/// back to back. Each packet is checksum-validated; payloads concatenate and
/// the final two bytes form the status word.
pub fn parse_response(buffer: &[u8]) -> Result<ParsedResponse> {
    let mut data = Vec::with_capacity(buffer.len());
    let mut nad = None;
    let mut i = 0usize;
    while i < buffer.len() {
        if buffer.len() - i < 4 {
            return Err(Error::FrameFormat(format!(
                "{} stray byte(s) after last packet",
                buffer.len() - i
            )));
        }
        let len = buffer[i + 2] as usize;
        let end = i + 3 + len + 1;
        if end > buffer.len() {
            return Err(Error::InvalidLength {
                expected: end,
                actual: buffer.len(),
            });
        }
        let packet = validate_received(&buffer[i..end])?;
        nad.get_or_insert(packet.nad);
        data.extend_from_slice(&packet.payload);
        i = end;
    }

    let nad = nad.ok_or_else(|| Error::FrameFormat("empty response buffer".to_string()))?;
    if data.len() < 2 {
        return Err(Error::FrameFormat(
            "response shorter than a status word".to_string(),
        ));
    }
    let sw2 = data.pop().unwrap_or_default();
    let sw1 = data.pop().unwrap_or_default();
    Ok(ParsedResponse {
        nad,
        data,
        status: StatusWord { sw1, sw2 },
    })
}

/// Route a parsed response to the installed handler.
///
/// Contactless-sourced messages go to the contactless handler on NAD alone.
/// Terminal messages prefer the tagged handler when one is installed and the
/// payload is well-formed TLV; otherwise the tagless handler takes the raw
/// bytes. No matching handler is a fault the link logs and drops.
pub fn dispatch(handlers: &ResponseHandlers, response: ParsedResponse) -> Result<()> {
    if response.nad == NAD_CONTACTLESS {
        return match &handlers.contactless {
            Some(handler) => {
                handler(response.data, response.status);
                Ok(())
            }
            None => Err(Error::UnrecognizedResponse),
        };
    }

    if let Some(handler) = &handlers.tagged {
        if let Ok(elements) = tlv::parse(&response.data) {
            handler(elements, response.status);
            return Ok(());
        }
    }

    if let Some(handler) = &handlers.tagless {
        handler(response.data, response.status);
        return Ok(());
    }

    Err(Error::UnrecognizedResponse)
}
