//! Command/reply protocol over a write + notify transport.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Link Stack                             │
//! │                                                              │
//! │  ┌───────────┐   ┌──────────┐   ┌─────────────────────────┐ │
//! │  │ Dispatcher│──▶│ Chunked  │──▶│ Correlator              │ │
//! │  │ (engine)  │   │ download │   │ send_and_await(cmd, t)  │ │
//! │  └───────────┘   └──────────┘   └─────────────────────────┘ │
//! │                                     │ write        ▲ slot    │
//! │                                     ▼              │         │
//! │                               ┌──────────┐   ┌──────────┐   │
//! │                               │Transport │──▶│ReplySlot │   │
//! │                               │ (trait)  │   │(channels)│   │
//! │                               └──────────┘   └──────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod chunked;
pub mod codec;
pub mod correlator;
pub mod engine;
pub mod transport;
