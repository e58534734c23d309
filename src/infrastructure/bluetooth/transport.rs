//! Platform seam for BLE access.
//!
//! The control channel only needs three things from a platform: pick a
//! device, open a write characteristic on it, and hear about link loss.

use crate::infrastructure::bluetooth::protocol::{DeviceFilter, Uuid128};
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralInfo {
    pub address: u64,
    pub name: String,
}

pub type DisconnectCallback = Box<dyn Fn() + Send + Sync + 'static>;

#[allow(async_fn_in_trait)]
pub trait BleTransport {
    type Link: BleLink;

    /// Whether the host has a usable BLE adapter
    async fn is_available(&self) -> bool;

    /// Run the device picker. `Ok(None)` means the user backed out.
    async fn request_device(&self, filter: &DeviceFilter) -> Result<Option<PeripheralInfo>>;

    /// Connect and resolve `characteristic` inside `service`
    async fn open(
        &self,
        peripheral: &PeripheralInfo,
        service: Uuid128,
        characteristic: Uuid128,
    ) -> Result<Self::Link>;
}

#[allow(async_fn_in_trait)]
pub trait BleLink: Clone + Send + 'static {
    fn name(&self) -> String;

    async fn write(&self, bytes: &[u8]) -> Result<()>;

    fn disconnect(&self) -> Result<()>;

    /// Register a listener for spontaneous link loss
    fn on_disconnect(&self, callback: DisconnectCallback) -> Result<()>;
}
