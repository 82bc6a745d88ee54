//! Unified error type for the BeanOS link.
//!
//! A single `Error` enum that the codec, correlator, download driver and
//! session service all return, so the binary's top-level handling is
//! uniform. None of these are retried automatically: each one ends the
//! current operation with a human-readable cause.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level link error
// ---------------------------------------------------------------------------

/// Every fallible operation in the link funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No device with the expected name was seen during the scan window.
    NotFound(String),
    /// The transport rejected a write, subscribe or connect.
    Transport(String),
    /// No reply arrived before the deadline.
    TimedOut,
    /// A reply was required but none (or an empty one) arrived.
    NoResponse,
    /// A reply did not have the expected shape.
    Protocol(&'static str),
    /// A data chunk was not a valid even-length hex string.
    MalformedHex,
    /// A notification payload was not valid UTF-8.
    Encoding,
    /// The peripheral explicitly reported a failure string.
    Peripheral(String),
    /// A chunk request timed out or came back empty mid-transfer.
    IncompleteTransfer { offset: u64, total: u64 },
    /// The peripheral returned zero usable bytes before the end of file.
    Stalled { offset: u64 },
    /// The output sink could not be created or written.
    Io(String),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "device named {name:?} not found"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::TimedOut => write!(f, "timed out waiting for reply"),
            Self::NoResponse => write!(f, "no response from peripheral"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
            Self::MalformedHex => write!(f, "malformed hex chunk"),
            Self::Encoding => write!(f, "reply is not valid UTF-8"),
            Self::Peripheral(reply) => write!(f, "peripheral reported: {reply}"),
            Self::IncompleteTransfer { offset, total } => {
                write!(f, "no data at offset {offset} of {total}")
            }
            Self::Stalled { offset } => {
                write!(f, "peripheral returned no usable bytes at offset {offset}")
            }
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Self {
        Self::MalformedHex
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(_: core::str::Utf8Error) -> Self {
        Self::Encoding
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Link-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
