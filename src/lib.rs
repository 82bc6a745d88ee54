//! BeanOS host link library.
//!
//! Exposes the protocol core (codec, correlator, chunked download,
//! dispatcher) and the session service for integration testing and for
//! the `beanlink` binary. Bluetooth-specific code is guarded by the `ble`
//! feature inside [`adapters`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod rpc;

mod error;

pub use error::{Error, Result};

// Link the `embassy-time` std driver that backs `async_io_mini::Timer`.
use embassy_time as _;
