//! Link service: one device session per call.
//!
//! [`LinkService`] owns the discovery adapter and configuration. Each
//! [`run`](LinkService::run) resolves the device by name, connects,
//! subscribes, dispatches one operation, and releases the connection on
//! every exit path.
//!
//! ```text
//!  Discovery ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                │        LinkService          │
//!  SinkProvider ◀│ scan · connect · dispatch   │
//!                └─────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::LinkConfig;
use crate::error::{Error, Result};
use crate::rpc::correlator::Correlator;
use crate::rpc::engine::{Dispatcher, OperationResult};
use crate::rpc::transport::{Characteristic, Transport};

use super::commands::Operation;
use super::events::LinkEvent;
use super::ports::{DiscoveredDevice, Discovery, EventSink, SinkProvider};

// ───────────────────────────────────────────────────────────────
// LinkService
// ───────────────────────────────────────────────────────────────

/// Orchestrates device sessions.
pub struct LinkService<D: Discovery> {
    discovery: D,
    config: LinkConfig,
}

impl<D: Discovery> LinkService<D> {
    pub fn new(discovery: D, config: LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { discovery, config })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn discovery(&self) -> &D {
        &self.discovery
    }

    /// Scan once and pick the first device advertising the configured name.
    pub async fn find_device(&mut self) -> Result<DiscoveredDevice> {
        let seen = self
            .discovery
            .scan(self.config.scan_timeout())
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        info!("scan saw {} device(s)", seen.len());

        seen.into_iter()
            .find(|d| d.name.as_deref() == Some(self.config.device_name.as_str()))
            .ok_or_else(|| Error::NotFound(self.config.device_name.clone()))
    }

    /// Run `op` in a fresh session.
    pub async fn run<P, E>(&mut self, op: Operation, sinks: &mut P, events: &mut E) -> Result<OperationResult>
    where
        P: SinkProvider,
        E: EventSink,
    {
        let device = self.find_device().await?;
        info!("connecting to {} ({})", self.config.device_name, device.id);

        let connection = self
            .discovery
            .connect(&device)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let mut link = Correlator::new(
            connection,
            Characteristic::new(self.config.command_uuid.as_str()),
            Characteristic::new(self.config.reply_uuid.as_str()),
        );

        let result = self.session(&mut link, op, sinks, events).await;

        // Released regardless of how the session ended.
        if let Err(e) = link.close().await {
            warn!("close failed: {}", e);
        }
        events.emit(&LinkEvent::Disconnected {
            device: self.config.device_name.clone(),
        });

        result
    }

    async fn session<T, P, E>(
        &self,
        link: &mut Correlator<T>,
        op: Operation,
        sinks: &mut P,
        events: &mut E,
    ) -> Result<OperationResult>
    where
        T: Transport,
        P: SinkProvider,
        E: EventSink,
    {
        link.subscribe().await?;
        events.emit(&LinkEvent::Connected {
            device: self.config.device_name.clone(),
        });

        Dispatcher::new(link, &self.config).run(op, sinks, events).await
    }
}
