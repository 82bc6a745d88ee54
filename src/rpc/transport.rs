//! Transport abstraction: a connected GATT peripheral.
//!
//! Concrete implementations:
//! - BLE via btleplug (`adapters::ble`, `ble` feature)
//! - scripted in-process peripherals in the test suites
//!
//! The correlator and download driver are generic over `Transport`, so
//! adding a new transport requires zero changes to the protocol logic.

use core::fmt;
use core::future::Future;

use super::channels::NotifySink;

/// Addressable endpoint on the peripheral, identified by UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Characteristic(pub String);

impl Characteristic {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self(uuid.into())
    }

    pub fn uuid(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An open connection to one peripheral.
pub trait Transport {
    /// Error type for this transport.
    type Error: fmt::Display;

    /// Write `data` to `characteristic` (write without response).
    fn write(
        &mut self,
        characteristic: &Characteristic,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Enable notifications on `characteristic` and forward every payload,
    /// in arrival order, to `sink`.
    fn subscribe(
        &mut self,
        characteristic: &Characteristic,
        sink: NotifySink,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Release the connection.
    fn close(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
}
