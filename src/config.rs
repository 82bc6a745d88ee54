//! Link configuration parameters
//!
//! All tunable parameters for talking to a BeanOS peripheral.
//! Values can be overridden from a JSON file or from the command line.

use core::time::Duration;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// GATT service exposed by the BeanOS firmware.
pub const SERVICE_UUID: &str = "2b771fcc-c87d-42bd-9216-000000000000";

/// Command characteristic (host writes, write-without-response).
pub const CTRL_RX_UUID: &str = "2b771fcc-c87d-42bd-9216-000000000020";

/// Reply characteristic (peripheral notifies).
pub const CTRL_TX_UUID: &str = "2b771fcc-c87d-42bd-9216-000000000010";

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    // --- Discovery ---
    /// Advertised name of the peripheral
    pub device_name: String,
    /// Scan window before giving up (milliseconds)
    pub scan_timeout_ms: u64,

    // --- GATT (characteristics of SERVICE_UUID) ---
    /// Characteristic commands are written to
    pub command_uuid: String,
    /// Characteristic replies are notified on
    pub reply_uuid: String,

    // --- Timing ---
    /// Deadline for the `data_stats` reply (milliseconds)
    pub stats_timeout_ms: u64,
    /// Deadline for each `data_bytes` reply; the peripheral reads flash (milliseconds)
    pub chunk_timeout_ms: u64,
    /// Deadline for short commands such as `req_height` (milliseconds)
    pub command_timeout_ms: u64,

    // --- Output ---
    /// Directory downloaded files are written into
    pub output_dir: PathBuf,
    /// Prefix prepended to the peripheral's filename
    pub output_prefix: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            // Discovery
            device_name: "BeanOS".into(),
            scan_timeout_ms: 5_000,

            // GATT
            command_uuid: CTRL_RX_UUID.into(),
            reply_uuid: CTRL_TX_UUID.into(),

            // Timing
            stats_timeout_ms: 5_000,
            chunk_timeout_ms: 10_000,
            command_timeout_ms: 5_000,

            // Output
            output_dir: PathBuf::from("."),
            output_prefix: "downloaded_".into(),
        }
    }
}

impl LinkConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("invalid JSON config"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the link unusable.
    pub fn validate(&self) -> Result<()> {
        if self.device_name.is_empty() {
            return Err(Error::Config("device_name must not be empty"));
        }
        if self.scan_timeout_ms == 0
            || self.stats_timeout_ms == 0
            || self.chunk_timeout_ms == 0
            || self.command_timeout_ms == 0
        {
            return Err(Error::Config("timeouts must be strictly positive"));
        }
        if self.command_uuid == self.reply_uuid {
            return Err(Error::Config("command and reply characteristics must differ"));
        }
        Ok(())
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn stats_timeout(&self) -> Duration {
        Duration::from_millis(self.stats_timeout_ms)
    }

    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_millis(self.chunk_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}
