//! Named operations the host can ask a peripheral to perform.
//!
//! These are the whole command surface: one dispatcher
//! ([`Dispatcher`](crate::rpc::engine::Dispatcher)) handles every one of
//! them over the same connection and correlation machinery.

use core::fmt;
use core::str::FromStr;

use crate::error::Error;
use crate::rpc::codec::Command;

/// How a command's reply is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPolicy {
    /// An acknowledgement may or may not arrive; silence is success.
    Optional,
    /// A textual reply is required; silence is an error.
    Required,
}

/// Operations exposed to the outside world (CLI, scripts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Start streaming flight metrics.
    EnableMetrics,
    /// Stop streaming flight metrics.
    DisableMetrics,
    /// Read the current altitude.
    ReqHeight,
    /// Read the maximum altitude of the last flight.
    GetMaxHeight,
    /// Download the peripheral's data file.
    StoreFile,
}

impl Operation {
    pub const ALL: [Self; 5] = [
        Self::EnableMetrics,
        Self::DisableMetrics,
        Self::ReqHeight,
        Self::GetMaxHeight,
        Self::StoreFile,
    ];

    /// CLI / wire name of the operation.
    pub const fn name(self) -> &'static str {
        match self {
            Self::EnableMetrics => "enable_metrics",
            Self::DisableMetrics => "disable_metrics",
            Self::ReqHeight => "req_height",
            Self::GetMaxHeight => "get_max_height",
            Self::StoreFile => "store_file",
        }
    }

    /// The single command line for a simple operation, with its reply
    /// policy. `StoreFile` is a multi-round transfer and has none.
    pub const fn command(self) -> Option<(Command, ReplyPolicy)> {
        match self {
            Self::EnableMetrics => Some((Command::new("enable_metrics"), ReplyPolicy::Optional)),
            Self::DisableMetrics => Some((Command::new("disable_metrics"), ReplyPolicy::Optional)),
            Self::ReqHeight => Some((Command::new("req_height"), ReplyPolicy::Required)),
            Self::GetMaxHeight => Some((Command::new("get_max_height"), ReplyPolicy::Required)),
            Self::StoreFile => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or(Error::Config("unknown operation"))
    }
}
