// vipalink-rs/vipalink/src/protocol/tlv.rs

//! Minimal BER-TLV reader for tagged response payloads.
//!
//! Covers what the terminal actually emits: one- and two-byte tags and
//! short, `0x81` and `0x82` length forms. Constructed templates are kept
//! as opaque values; callers that need the children parse the value again.

use crate::{Error, Result};

/// One tag-length-value element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    /// Raw tag bytes (one or two).
    pub tag: Vec<u8>,
    /// Value bytes.
    pub value: Vec<u8>,
}

impl Tlv {
    /// Whether the tag marks a constructed (template) element.
    pub fn is_constructed(&self) -> bool {
        self.tag.first().is_some_and(|b| b & 0x20 != 0)
    }
}

/// Parse a byte slice as a sequence of TLV elements.
///
/// The whole slice must be consumed; trailing garbage fails the parse, which
/// is what lets the dispatcher distinguish tagged from tagless payloads.
pub fn parse(bytes: &[u8]) -> Result<Vec<Tlv>> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let (tlv, consumed) = parse_one(&bytes[i..])?;
        out.push(tlv);
        i += consumed;
    }
    if out.is_empty() {
        return Err(Error::FrameFormat("empty TLV payload".to_string()));
    }
    Ok(out)
}

/// Find the first element with the given one-byte tag.
pub fn find<'a>(elements: &'a [Tlv], tag: u8) -> Option<&'a Tlv> {
    elements.iter().find(|t| t.tag.as_slice() == [tag])
}

fn parse_one(bytes: &[u8]) -> Result<(Tlv, usize)> {
    if bytes.len() < 2 {
        return Err(Error::FrameFormat("truncated TLV header".to_string()));
    }

    // Tag: low five bits all set means a subsequent tag byte follows.
    let tag_len = if bytes[0] & 0x1F == 0x1F { 2 } else { 1 };
    if bytes.len() < tag_len + 1 {
        return Err(Error::FrameFormat("truncated TLV tag".to_string()));
    }
    let tag = bytes[..tag_len].to_vec();

    let mut i = tag_len;
    let first_len = bytes[i];
    i += 1;
    let len = match first_len {
        0x00..=0x7F => first_len as usize,
        0x81 => {
            let b = *bytes
                .get(i)
                .ok_or_else(|| Error::FrameFormat("truncated TLV length".to_string()))?;
            i += 1;
            b as usize
        }
        0x82 => {
            if bytes.len() < i + 2 {
                return Err(Error::FrameFormat("truncated TLV length".to_string()));
            }
            let len = ((bytes[i] as usize) << 8) | bytes[i + 1] as usize;
            i += 2;
            len
        }
        other => {
            return Err(Error::FrameFormat(format!(
                "unsupported TLV length form 0x{:02X}",
                other
            )));
        }
    };

    if bytes.len() < i + len {
        return Err(Error::FrameFormat(format!(
            "TLV value needs {} bytes, {} remain",
            len,
            bytes.len() - i
        )));
    }
    let value = bytes[i..i + len].to_vec();
    Ok((Tlv { tag, value }, i + len))
}
