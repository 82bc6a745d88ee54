//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured link events through the
//! `log` facade. The binary installs the backend; a GUI or progress-bar
//! adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::{LinkEvent, percent};
use crate::app::ports::EventSink;

/// Adapter that logs every [`LinkEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Connected { device } => {
                info!("LINK  | connected to {}", device);
            }
            LinkEvent::Disconnected { device } => {
                info!("LINK  | disconnected from {}", device);
            }
            LinkEvent::CommandReply { verb, reply } => match reply {
                Some(text) => info!("CMD   | {} -> {}", verb, text),
                None => info!("CMD   | {} (no reply)", verb),
            },
            LinkEvent::TransferStarted {
                filename,
                total_bytes,
            } => {
                info!("XFER  | {} ({} bytes)", filename, total_bytes);
            }
            LinkEvent::TransferProgress { written, total } => {
                info!(
                    "XFER  | progress: {}/{} bytes ({:.1}%)",
                    written,
                    total,
                    percent(*written, *total)
                );
            }
            LinkEvent::TransferComplete { filename, bytes } => {
                info!("XFER  | download complete: {} ({} bytes)", filename, bytes);
            }
            LinkEvent::TransferAborted {
                written,
                total,
                cause,
            } => {
                warn!(
                    "XFER  | download incomplete at {}/{} bytes: {}",
                    written, total, cause
                );
            }
        }
    }
}
