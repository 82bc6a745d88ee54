//! Port traits: the boundary between the link core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Session service / download driver
//! ```
//!
//! Driven adapters (BLE discovery, output files, event sinks) implement
//! these traits. The core consumes them via generics, so it never touches
//! a Bluetooth stack or the filesystem directly. The connection itself is
//! the [`Transport`](crate::rpc::transport::Transport) trait.

use core::fmt;
use core::future::Future;
use core::time::Duration;
use std::io;

use crate::rpc::transport::Transport;

// ───────────────────────────────────────────────────────────────
// Discovery port (driven adapter: radio → core)
// ───────────────────────────────────────────────────────────────

/// A peripheral seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Advertised local name, if any.
    pub name: Option<String>,
    /// Connectable identifier (address or platform handle).
    pub id: String,
}

/// Finds peripherals and opens connections to them.
pub trait Discovery {
    type Connection: Transport;
    type Error: fmt::Display;

    /// Scan for `timeout` and return everything seen.
    fn scan(&mut self, timeout: Duration)
    -> impl Future<Output = Result<Vec<DiscoveredDevice>, Self::Error>>;

    /// Connect to a previously discovered device.
    fn connect(
        &mut self,
        device: &DiscoveredDevice,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>>;
}

// ───────────────────────────────────────────────────────────────
// Output sink port (driven adapter: core → storage)
// ───────────────────────────────────────────────────────────────

/// Opens the byte sink a download is written into.
///
/// Called only after a valid `data_stats` reply, so a failed stats query
/// never leaves an output file behind. The returned sink is dropped (and
/// therefore closed) on every exit path of the download.
pub trait SinkProvider {
    type Sink: io::Write;

    /// Create a fresh sink for the peripheral-side `filename`.
    fn create(&mut self, filename: &str) -> io::Result<Self::Sink>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / UI)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`LinkEvent`](super::events::LinkEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LinkEvent);
}

/// Event sink that discards everything.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: &super::events::LinkEvent) {}
}
