//! Fallback backend for hosts without a supported BLE stack.

use crate::domain::models::{AppEvent, DevicePick};
use crate::infrastructure::bluetooth::picker::DevicePicker;
use crate::infrastructure::bluetooth::protocol::{DeviceFilter, Uuid128};
use crate::infrastructure::bluetooth::transport::{
    BleLink, BleTransport, DisconnectCallback, PeripheralInfo,
};
use anyhow::Result;
use tokio::sync::mpsc;

pub struct NoBluetooth {
    picker: DevicePicker,
}

impl NoBluetooth {
    pub fn new(picker: DevicePicker, _event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { picker }
    }
}

#[derive(Clone)]
pub struct NoLink;

impl BleTransport for NoBluetooth {
    type Link = NoLink;

    async fn is_available(&self) -> bool {
        false
    }

    async fn request_device(&self, _filter: &DeviceFilter) -> Result<Option<PeripheralInfo>> {
        // Nothing is ever scanned, so the only possible answer is a cancel
        match self.picker.prompt().await {
            Some(DevicePick::Selected(address)) => {
                anyhow::bail!("No Bluetooth LE stack to reach {:#X}", address)
            }
            Some(DevicePick::Cancelled) | None => Ok(None),
        }
    }

    async fn open(
        &self,
        _peripheral: &PeripheralInfo,
        _service: Uuid128,
        _characteristic: Uuid128,
    ) -> Result<NoLink> {
        anyhow::bail!("Bluetooth LE is not supported on this platform")
    }
}

impl BleLink for NoLink {
    fn name(&self) -> String {
        String::new()
    }

    async fn write(&self, _bytes: &[u8]) -> Result<()> {
        anyhow::bail!("Bluetooth LE is not supported on this platform")
    }

    fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    fn on_disconnect(&self, _callback: DisconnectCallback) -> Result<()> {
        Ok(())
    }
}
