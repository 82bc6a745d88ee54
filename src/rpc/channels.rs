//! Reply slot shared between the notification source and the correlator.
//!
//! Uses an `embassy-sync` [`Signal`] as a single-slot exchange: the
//! transport's event source (a BLE notification task, a test thread)
//! overwrites the slot, and the correlator awaits and consumes it.
//!
//! ```text
//! ┌──────────────────┐  notification  ┌────────────┐  wait()  ┌────────────┐
//! │ Transport events │──────────────▶│ ReplySlot  │────────▶│ Correlator │
//! │ (async / thread) │   signal()     │ (1 value)  │          │            │
//! └──────────────────┘                └────────────┘          └────────────┘
//! ```
//!
//! One slot per connection; nothing here is process-wide.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::debug;

/// Raw notification payload as delivered by the transport.
pub type Notification = Vec<u8>;

/// Single-slot "latest reply" exchange. A newer notification replaces an
/// unconsumed older one.
pub struct ReplySlot {
    signal: Signal<CriticalSectionRawMutex, Notification>,
}

impl ReplySlot {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Store a notification, waking the waiter if there is one.
    pub fn deliver(&self, payload: Notification) {
        if self.signal.signaled() {
            debug!("reply slot: unconsumed reply overwritten");
        }
        self.signal.signal(payload);
    }

    /// Drop any reply that arrived while nothing was waiting.
    pub fn clear(&self) -> Option<Notification> {
        let stale = self.signal.try_take();
        self.signal.reset();
        stale
    }

    /// Wait for the next delivered notification and consume it.
    pub async fn take(&self) -> Notification {
        self.signal.wait().await
    }

    /// Whether a reply is buffered.
    pub fn is_filled(&self) -> bool {
        self.signal.signaled()
    }
}

impl Default for ReplySlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle given to a transport's subscription so it can push notifications
/// into the connection's reply slot.
#[derive(Clone)]
pub struct NotifySink {
    slot: Arc<ReplySlot>,
}

impl NotifySink {
    pub fn new(slot: Arc<ReplySlot>) -> Self {
        Self { slot }
    }

    /// Called by the transport for every inbound notification, in order.
    pub fn notify(&self, payload: &[u8]) {
        self.slot.deliver(payload.to_vec());
    }
}
