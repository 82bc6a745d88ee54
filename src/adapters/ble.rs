//! BLE central adapter: btleplug implementation of the link ports.
//!
//! Implements [`Discovery`] (scan + connect) and [`Transport`] (GATT write
//! + notify) on top of the platform Bluetooth stack. Commands go out as
//! write-without-response on the command characteristic; notifications
//! on the reply characteristic are forwarded by a background task into
//! the correlator's [`NotifySink`].
//!
//! ## GATT Service Layout (BeanOS firmware)
//!
//! | Characteristic | UUID                                   | Perms       |
//! |----------------|----------------------------------------|-------------|
//! | CTRL_RX        | `2b771fcc-c87d-42bd-9216-000000000020` | Write       |
//! | CTRL_TX        | `2b771fcc-c87d-42bd-9216-000000000010` | Notify      |

use core::fmt;
use core::time::Duration;

use btleplug::api::{
    Central as _, Characteristic as GattCharacteristic, Manager as _, Peripheral as _, ScanFilter,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures_lite::StreamExt;
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::app::ports::{DiscoveredDevice, Discovery};
use crate::rpc::channels::NotifySink;
use crate::rpc::transport::{Characteristic, Transport};

// ── Error type ───────────────────────────────────────────────

#[derive(Debug)]
pub enum BleError {
    /// The host has no Bluetooth adapter.
    NoAdapter,
    /// The device vanished between scan and connect.
    UnknownDevice(String),
    /// The peripheral does not expose the characteristic.
    MissingCharacteristic(String),
    /// A configured UUID does not parse.
    BadUuid(String),
    /// Error from the platform stack.
    Stack(btleplug::Error),
}

impl fmt::Display for BleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAdapter => write!(f, "BLE: no adapter found"),
            Self::UnknownDevice(id) => write!(f, "BLE: device {id} no longer visible"),
            Self::MissingCharacteristic(uuid) => write!(f, "BLE: characteristic {uuid} not found"),
            Self::BadUuid(uuid) => write!(f, "BLE: invalid UUID {uuid:?}"),
            Self::Stack(e) => write!(f, "BLE: {e}"),
        }
    }
}

impl std::error::Error for BleError {}

impl From<btleplug::Error> for BleError {
    fn from(e: btleplug::Error) -> Self {
        Self::Stack(e)
    }
}

// ── Discovery ────────────────────────────────────────────────

/// Scans with the first platform adapter.
pub struct BleDiscovery {
    central: Adapter,
}

impl BleDiscovery {
    pub async fn new() -> Result<Self, BleError> {
        let manager = Manager::new().await?;
        let central = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(BleError::NoAdapter)?;
        Ok(Self { central })
    }

    async fn peripheral_by_id(&self, id: &str) -> Result<Peripheral, BleError> {
        self.central
            .peripherals()
            .await?
            .into_iter()
            .find(|p| p.id().to_string() == id)
            .ok_or_else(|| BleError::UnknownDevice(id.to_owned()))
    }
}

impl Discovery for BleDiscovery {
    type Connection = BleConnection;
    type Error = BleError;

    async fn scan(&mut self, timeout: Duration) -> Result<Vec<DiscoveredDevice>, BleError> {
        self.central.start_scan(ScanFilter::default()).await?;
        tokio::time::sleep(timeout).await;
        self.central.stop_scan().await?;

        let mut seen = Vec::new();
        for p in self.central.peripherals().await? {
            let name = p.properties().await?.and_then(|props| props.local_name);
            debug!("scan: {} {:?}", p.id(), name);
            seen.push(DiscoveredDevice {
                name,
                id: p.id().to_string(),
            });
        }
        Ok(seen)
    }

    async fn connect(&mut self, device: &DiscoveredDevice) -> Result<BleConnection, BleError> {
        let peripheral = self.peripheral_by_id(&device.id).await?;
        peripheral.connect().await?;
        peripheral.discover_services().await?;
        info!("BLE: connected to {}", device.id);
        Ok(BleConnection {
            peripheral,
            forwarder: None,
        })
    }
}

// ── Connection ───────────────────────────────────────────────

/// Connected peripheral.
pub struct BleConnection {
    peripheral: Peripheral,
    forwarder: Option<JoinHandle<()>>,
}

impl BleConnection {
    fn gatt(&self, characteristic: &Characteristic) -> Result<GattCharacteristic, BleError> {
        let uuid = Uuid::parse_str(characteristic.uuid())
            .map_err(|_| BleError::BadUuid(characteristic.uuid().to_owned()))?;
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or_else(|| BleError::MissingCharacteristic(characteristic.uuid().to_owned()))
    }
}

impl Transport for BleConnection {
    type Error = BleError;

    async fn write(&mut self, characteristic: &Characteristic, data: &[u8]) -> Result<(), BleError> {
        let gatt = self.gatt(characteristic)?;
        self.peripheral
            .write(&gatt, data, WriteType::WithoutResponse)
            .await?;
        Ok(())
    }

    async fn subscribe(&mut self, characteristic: &Characteristic, sink: NotifySink) -> Result<(), BleError> {
        let gatt = self.gatt(characteristic)?;
        self.peripheral.subscribe(&gatt).await?;

        let mut notifications = self.peripheral.notifications().await?;
        let uuid = gatt.uuid;
        self.forwarder = Some(tokio::spawn(async move {
            while let Some(n) = notifications.next().await {
                if n.uuid == uuid {
                    sink.notify(&n.value);
                }
            }
            debug!("BLE: notification stream ended");
        }));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BleError> {
        if let Some(task) = self.forwarder.take() {
            task.abort();
        }
        if self.peripheral.is_connected().await.unwrap_or(false) {
            self.peripheral.disconnect().await?;
        } else {
            warn!("BLE: already disconnected");
        }
        Ok(())
    }
}
