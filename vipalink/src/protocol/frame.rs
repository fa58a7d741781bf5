// vipalink-rs/vipalink/src/protocol/frame.rs

use crate::constants::{MIN_PACKET_LEN, NAD_TERMINAL, TX_HEADER_LEN};
use crate::protocol::checksum::lrc;
use crate::{Error, Result};

/// One VIPA command prior to encoding.
///
/// Wire format of an unchained packet:
/// `NAD PCB LEN CLA INS P1 P2 [Lc data…] [Le] LRC`
///
/// The LEN byte is the length of the packet. It includes the CLA, INS, P1,
/// P2 bytes (but not for continuation packets of chained commands),
/// includes the Lc and data field bytes if present, and includes the Le
/// byte if present, but excludes the LRC byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VipaCommand {
    /// Node address byte.
    pub nad: u8,
    /// Protocol control byte; bit 0 is the chain-continuation bit.
    pub pcb: u8,
    /// Command class.
    pub cla: u8,
    /// Instruction.
    pub ins: u8,
    /// First parameter.
    pub p1: u8,
    /// Second parameter.
    pub p2: u8,
    /// Optional data field (Lc is derived from its length).
    pub data: Option<Vec<u8>>,
    /// Whether to append the Le byte.
    pub include_le: bool,
    /// Expected response length byte, written only when `include_le` is set.
    pub le: u8,
}

impl VipaCommand {
    /// Create a data-less command addressed to the terminal.
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            nad: NAD_TERMINAL,
            pcb: 0x00,
            cla,
            ins,
            p1,
            p2,
            data: None,
            include_le: false,
            le: 0x00,
        }
    }

    /// Attach a data field.
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = if data.is_empty() { None } else { Some(data) };
        self
    }

    /// Request the Le byte with the given value.
    pub fn with_le(mut self, le: u8) -> Self {
        self.include_le = true;
        self.le = le;
        self
    }

    /// Combined CLA/INS view used for command-type lookups.
    pub fn class_ins(&self) -> (u8, u8) {
        (self.cla, self.ins)
    }

    fn data_len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    /// Encode into a single packet with trailing LRC.
    ///
    /// Fails with [`Error::Encoding`] when the command's data field pushes
    /// it past the single-packet limit; such commands must go through
    /// [`crate::protocol::chaining::split_for_chaining`].
    pub fn encode(&self) -> Result<Vec<u8>> {
        if crate::protocol::chaining::requires_chaining(self) {
            return Err(Error::Encoding(format!(
                "data field of {} bytes requires chaining",
                self.data_len()
            )));
        }

        let data_len = self.data_len();
        let mut field_len = data_len;
        if data_len > 0 {
            field_len += 1; // Lc byte
        }
        if self.include_le {
            field_len += 1; // Le byte
        }

        let len = TX_HEADER_LEN + field_len;
        if len > 0xFF {
            return Err(Error::Encoding(format!(
                "LEN {} overflows a single byte",
                len
            )));
        }

        let mut out = Vec::with_capacity(3 + len + 1);
        out.push(self.nad);
        out.push(self.pcb);
        out.push(len as u8);
        out.push(self.cla);
        out.push(self.ins);
        out.push(self.p1);
        out.push(self.p2);
        if let Some(data) = &self.data {
            out.push(data.len() as u8);
            out.extend_from_slice(data);
        }
        if self.include_le {
            out.push(self.le);
        }
        out.push(lrc(&out));
        Ok(out)
    }

    /// Decode a single validated packet back into a command.
    ///
    /// Inverse of [`VipaCommand::encode`]; used by tests and by tooling
    /// that inspects captured traffic.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let packet = validate_received(bytes)?;
        let body = &packet.payload;
        if body.len() < TX_HEADER_LEN {
            return Err(Error::InvalidLength {
                expected: TX_HEADER_LEN,
                actual: body.len(),
            });
        }

        let mut cmd = Self::new(body[0], body[1], body[2], body[3]);
        cmd.nad = packet.nad;
        cmd.pcb = packet.pcb;

        let fields = &body[TX_HEADER_LEN..];
        match fields.len() {
            0 => {}
            // A lone trailing byte can only be Le: commands without a data
            // field carry no Lc byte.
            1 => {
                cmd.include_le = true;
                cmd.le = fields[0];
            }
            _ => {
                let lc = fields[0] as usize;
                if lc == 0 || fields.len() < 1 + lc {
                    return Err(Error::FrameFormat(format!(
                        "Lc {} inconsistent with {} field bytes",
                        lc,
                        fields.len()
                    )));
                }
                cmd.data = Some(fields[1..1 + lc].to_vec());
                match fields.len() - 1 - lc {
                    0 => {}
                    1 => {
                        cmd.include_le = true;
                        cmd.le = fields[1 + lc];
                    }
                    extra => {
                        return Err(Error::FrameFormat(format!(
                            "{} bytes after the data field",
                            extra
                        )));
                    }
                }
            }
        }
        Ok(cmd)
    }
}

/// A received packet whose LRC and structure have been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Node address byte.
    pub nad: u8,
    /// Protocol control byte.
    pub pcb: u8,
    /// The LEN-counted bytes between the header and the LRC.
    pub payload: Vec<u8>,
}

/// Validate a received packet: LRC first, structure second.
///
/// The checksum is recomputed over every byte but the last and compared to
/// the trailing byte before any structural field is trusted, so a single
/// corrupted bit anywhere outside the LRC reports [`Error::ChecksumMismatch`].
pub fn validate_received(bytes: &[u8]) -> Result<Packet> {
    if bytes.len() < MIN_PACKET_LEN {
        return Err(Error::InvalidLength {
            expected: MIN_PACKET_LEN,
            actual: bytes.len(),
        });
    }

    let expected = lrc(&bytes[..bytes.len() - 1]);
    let actual = bytes[bytes.len() - 1];
    if expected != actual {
        return Err(Error::ChecksumMismatch { expected, actual });
    }

    let len = bytes[2] as usize;
    let required = 3 + len + 1;
    if bytes.len() != required {
        return Err(Error::InvalidLength {
            expected: required,
            actual: bytes.len(),
        });
    }

    Ok(Packet {
        nad: bytes[0],
        pcb: bytes[1],
        payload: bytes[3..3 + len].to_vec(),
    })
}
