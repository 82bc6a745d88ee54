//! Adapter implementations of the app port traits.
//!
//! The BLE adapter needs a host Bluetooth stack and a tokio runtime, so it
//! is only compiled with the `ble` feature. The other adapters are plain
//! `std` and always available.

#[cfg(feature = "ble")]
pub mod ble;
pub mod file_sink;
pub mod log_sink;
