//! Request/reply correlation over a write + notify transport.
//!
//! The peripheral has no request IDs: a command is written to one
//! characteristic and the reply arrives later as an unsolicited
//! notification on another. The correlator turns that into
//! [`send_and_await`](Correlator::send_and_await) with a deadline.
//!
//! ```text
//!  send_and_await(cmd, t)
//!     │ clear stale slot
//!     │ write(cmd) ───────────────▶ peripheral
//!     │ race { slot.take(), Timer(t) }
//!     │                 ◀────────── notification
//!     ▼
//!  Outcome::Reply(text) | Outcome::TimedOut
//! ```
//!
//! ## Ordering
//!
//! `send_and_await` takes `&mut self`, so at most one request is ever
//! outstanding on a connection. Any notification that lands while a
//! request is pending is taken as its reply. A reply that arrives after
//! its request timed out is dropped by the next call's stale-slot clear
//! if it lands before that call's write; if it lands after the write it
//! is misattributed to the newer request. The wire format has no field
//! that could detect this.

use core::time::Duration;
use std::sync::Arc;

use futures_lite::future;
use log::{debug, warn};

use super::channels::{NotifySink, ReplySlot};
use super::codec::{self, Command};
use super::transport::{Characteristic, Transport};
use crate::error::{Error, Result};

/// Result of one correlated request that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Decoded, trimmed reply text. May be empty.
    Reply(String),
    /// No notification arrived before the deadline.
    TimedOut,
}

impl Outcome {
    /// The reply text, treating an empty reply the same as no reply.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Reply(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Owns a connection and its reply slot.
pub struct Correlator<T: Transport> {
    transport: T,
    command_char: Characteristic,
    reply_char: Characteristic,
    slot: Arc<ReplySlot>,
    subscribed: bool,
}

impl<T: Transport> Correlator<T> {
    pub fn new(transport: T, command_char: Characteristic, reply_char: Characteristic) -> Self {
        Self {
            transport,
            command_char,
            reply_char,
            slot: Arc::new(ReplySlot::new()),
            subscribed: false,
        }
    }

    /// Enable notifications on the reply characteristic, routed into this
    /// correlator's slot. Must be called before the first request.
    pub async fn subscribe(&mut self) -> Result<()> {
        let sink = NotifySink::new(Arc::clone(&self.slot));
        self.transport
            .subscribe(&self.reply_char, sink)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.subscribed = true;
        debug!("subscribed to {}", self.reply_char);
        Ok(())
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Write a command without waiting for any reply.
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        if let Some(stale) = self.slot.clear() {
            warn!("discarding stale reply ({} bytes)", stale.len());
        }
        debug!("-> {}", command);
        self.transport
            .write(&self.command_char, &codec::encode(command))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    /// Write a command and wait up to `timeout` for the next notification.
    ///
    /// A write failure returns `Error::Transport` without waiting. Expiry of
    /// the deadline is reported as `Outcome::TimedOut`, not as an error.
    /// Nothing is written until [`subscribe`](Self::subscribe) has succeeded.
    pub async fn send_and_await(&mut self, command: &Command, timeout: Duration) -> Result<Outcome> {
        if timeout.is_zero() {
            return Err(Error::Config("reply timeout must be strictly positive"));
        }
        if !self.subscribed {
            return Err(Error::Config("reply characteristic not subscribed"));
        }

        self.send(command).await?;

        let reply = future::or(async { Some(self.slot.take().await) }, async {
            async_io_mini::Timer::after(timeout).await;
            None
        })
        .await;

        match reply {
            Some(payload) => {
                let text = codec::decode_text(&payload)?;
                debug!("<- {}", preview(&text));
                Ok(Outcome::Reply(text))
            }
            None => {
                debug!("<- (timed out after {:?} on {})", timeout, command.verb());
                Ok(Outcome::TimedOut)
            }
        }
    }

    /// Close the underlying connection.
    pub async fn close(&mut self) -> Result<()> {
        self.subscribed = false;
        self.transport
            .close()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    /// Borrow the transport (tests inspect scripted peripherals this way).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

/// First 50 characters of a reply, for logging hex chunks.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ── Tests ────────────────────────────────────────────────────
