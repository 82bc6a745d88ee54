//! Outbound link events.
//!
//! The session service and download driver emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them: log them, print a progress bar, record
//! them in a test.

use crate::error::Error;

/// Structured events emitted while talking to a peripheral.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// Connected and subscribed to the reply characteristic.
    Connected { device: String },

    /// The connection was released.
    Disconnected { device: String },

    /// A short command finished. `reply` is `None` for an unanswered
    /// fire-and-forget command.
    CommandReply {
        verb: &'static str,
        reply: Option<String>,
    },

    /// A `data_stats` reply was accepted and the output sink opened.
    TransferStarted { filename: String, total_bytes: u64 },

    /// A chunk was appended to the sink.
    TransferProgress { written: u64, total: u64 },

    /// Every declared byte was written.
    TransferComplete { filename: String, bytes: u64 },

    /// The fetch loop stopped early; the partial file is kept.
    TransferAborted {
        written: u64,
        total: u64,
        cause: Error,
    },
}

/// Percentage of `total` covered by `written`. An empty file is 100 %.
pub fn percent(written: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        written as f64 / total as f64 * 100.0
    }
}
