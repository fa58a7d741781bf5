// vipalink-rs/vipalink/src/error.rs

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// No connected terminal matched the requested identifier.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Underlying serial port failure.
    // シリアルポート実装は feature で切り替えられるようにしている
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// Port-level failure outside the serial backend.
    #[error("connection error: {0}")]
    Connection(String),

    /// A packet's size disagreed with its LEN byte or the minimum.
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Length the structure calls for.
        expected: usize,
        /// Length actually seen.
        actual: usize,
    },

    /// The trailing LRC did not match the recomputed value.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// Recomputed LRC.
        expected: u8,
        /// LRC byte carried by the packet.
        actual: u8,
    },

    /// Structurally invalid packet or payload.
    #[error("frame format error: {0}")]
    FrameFormat(String),

    /// A command could not be written in the requested shape.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The state machine was asked for a transition it does not define.
    #[error("invalid state transition '{0}' requested")]
    InvalidStateTransition(String),

    /// A bounded read produced nothing. Non-fatal at the link boundary.
    #[error("read timed out")]
    Timeout,

    /// Brokered work ran out of time or the request was cancelled.
    #[error("operation timed out or was cancelled")]
    TimeoutOrCancelled,

    /// A response matched no installed handler classification.
    #[error("unrecognized response shape")]
    UnrecognizedResponse,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Connection(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
