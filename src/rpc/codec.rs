//! Text command codec.
//!
//! Wire format, one command per GATT write and one reply per notification:
//! ```text
//! host → peripheral   verb[,arg1[,arg2...]]        (UTF-8, no terminator)
//! peripheral → host   <text line> | <hex string>   (UTF-8, may end in \n)
//! ```
//!
//! There is no length prefix and no escaping. The notification boundary is
//! the only frame delimiter, so arguments must never contain the separator.

use crate::error::{Error, Result};

/// Argument separator on the command line.
pub const SEPARATOR: char = ',';

/// Reply the firmware sends when it cannot allocate a read buffer.
pub const MEMORY_ERROR: &str = "memory_error";

/// Prefix of every other peripheral-reported failure.
pub const ERROR_PREFIX: &str = "error";

// ── Commands ─────────────────────────────────────────────────

/// A single command line: a verb plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: &'static str,
    args: Vec<String>,
}

impl Command {
    /// A command with no arguments.
    pub const fn new(verb: &'static str) -> Self {
        Self {
            verb,
            args: Vec::new(),
        }
    }

    /// Append an argument. Rejects arguments containing the separator.
    pub fn arg(mut self, value: impl ToString) -> Result<Self> {
        let value = value.to_string();
        if value.contains(SEPARATOR) {
            return Err(Error::Protocol("argument contains separator"));
        }
        self.args.push(value);
        Ok(self)
    }

    pub fn verb(&self) -> &'static str {
        self.verb
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `data_stats`
    pub const fn data_stats() -> Self {
        Self::new("data_stats")
    }

    /// `data_bytes,<offset>`
    pub fn data_bytes(offset: u64) -> Self {
        Self {
            verb: "data_bytes",
            args: vec![offset.to_string()],
        }
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.verb)?;
        for arg in &self.args {
            write!(f, "{SEPARATOR}{arg}")?;
        }
        Ok(())
    }
}

/// Serialize a command into the bytes written to the command characteristic.
pub fn encode(command: &Command) -> Vec<u8> {
    command.to_string().into_bytes()
}

// ── Replies ──────────────────────────────────────────────────

/// Decode a notification payload as trimmed UTF-8 text.
pub fn decode_text(payload: &[u8]) -> Result<String> {
    let text = core::str::from_utf8(payload)?;
    Ok(text.trim().to_owned())
}

/// Decode a hex data line into raw bytes. An empty line yields no bytes.
pub fn decode_hex(line: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(line)?)
}

/// Whether a reply is a peripheral-reported failure rather than data.
pub fn is_error_reply(reply: &str) -> bool {
    reply == MEMORY_ERROR || reply.starts_with(ERROR_PREFIX)
}

/// Parsed `data_stats` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub filename: String,
    pub total_bytes: u64,
}

/// Parse `"<filename>,<total_bytes>"`.
///
/// Exactly two fields. The filename must be non-empty and must not contain
/// a path separator, since it becomes part of a local output path.
pub fn parse_stats(reply: &str) -> Result<FileStats> {
    const BAD: Error = Error::Protocol("bad stats reply");

    let mut fields = reply.split(SEPARATOR);
    let (Some(filename), Some(size), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(BAD);
    };
    if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
        return Err(BAD);
    }
    let total_bytes = size.trim().parse::<u64>().map_err(|_| BAD)?;

    Ok(FileStats {
        filename: filename.to_owned(),
        total_bytes,
    })
}

// ── Tests ────────────────────────────────────────────────────
