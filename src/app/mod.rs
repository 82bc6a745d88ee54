//! Application core: session orchestration, zero direct I/O.
//!
//! This module contains the host-side rules for talking to a BeanOS
//! peripheral: which operations exist, how a session is opened and
//! released, and what events are reported. All interaction with the radio
//! and the filesystem happens through **port traits** defined in
//! [`ports`], keeping this layer testable without real hardware.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
