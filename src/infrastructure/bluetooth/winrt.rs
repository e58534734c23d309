//! WinRT BLE backend.
//!
//! The device picker is an advertisement watcher: every matching roulette
//! device is forwarded to the UI as `AppEvent::DeviceFound`, and the watcher
//! runs until the UI answers the picker prompt.

use crate::domain::models::{AppEvent, DevicePick, ScannedDevice};
use crate::infrastructure::bluetooth::picker::DevicePicker;
use crate::infrastructure::bluetooth::protocol::{DeviceFilter, Uuid128};
use crate::infrastructure::bluetooth::transport::{
    BleLink, BleTransport, DisconnectCallback, PeripheralInfo,
};
use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};
use windows::core::GUID;
use windows::Devices::Bluetooth::Advertisement::{
    BluetoothLEAdvertisementReceivedEventArgs, BluetoothLEAdvertisementWatcher,
    BluetoothLEScanningMode,
};
use windows::Devices::Bluetooth::GenericAttributeProfile::{
    GattCharacteristic, GattCommunicationStatus,
};
use windows::Devices::Bluetooth::{BluetoothAdapter, BluetoothConnectionStatus, BluetoothLEDevice};
use windows::Foundation::TypedEventHandler;
use windows::Storage::Streams::DataWriter;

fn to_guid(uuid: Uuid128) -> GUID {
    GUID::from_values(uuid.data1, uuid.data2, uuid.data3, uuid.data4)
}

fn from_guid(guid: &GUID) -> Uuid128 {
    Uuid128 {
        data1: guid.data1,
        data2: guid.data2,
        data3: guid.data3,
        data4: guid.data4,
    }
}

pub struct WinRtTransport {
    picker: DevicePicker,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl WinRtTransport {
    pub fn new(picker: DevicePicker, event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            picker,
            event_sender,
        }
    }

    fn start_watcher(&self, filter: &DeviceFilter) -> Result<BluetoothLEAdvertisementWatcher> {
        let watcher = BluetoothLEAdvertisementWatcher::new()?;
        watcher.SetScanningMode(BluetoothLEScanningMode::Active)?;

        let sender = self.event_sender.clone();
        let filter = filter.clone();
        let handler = TypedEventHandler::new(
            move |_: windows::core::Ref<BluetoothLEAdvertisementWatcher>,
                  args: windows::core::Ref<BluetoothLEAdvertisementReceivedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let adv = args.Advertisement()?;
                    let name = adv.LocalName()?.to_string();
                    let service_uuids = adv.ServiceUuids()?;

                    let mut services = Vec::new();
                    for i in 0..service_uuids.Size()? {
                        services.push(from_guid(&service_uuids.GetAt(i)?));
                    }

                    if filter.matches(&name, &services) {
                        let _ = sender.send(AppEvent::DeviceFound(ScannedDevice {
                            name,
                            address: args.BluetoothAddress()?,
                            signal_strength: args.RawSignalStrengthInDBm()?,
                        }));
                    }
                }
                Ok(())
            },
        );

        watcher.Received(&handler)?;
        watcher.Start()?;
        Ok(watcher)
    }
}

impl BleTransport for WinRtTransport {
    type Link = WinRtLink;

    async fn is_available(&self) -> bool {
        let adapter = match BluetoothAdapter::GetDefaultAsync() {
            Ok(op) => op.await,
            Err(e) => Err(e),
        };
        match adapter {
            Ok(adapter) => adapter.IsLowEnergySupported().unwrap_or(false),
            Err(e) => {
                debug!("No default Bluetooth adapter: {:?}", e);
                false
            }
        }
    }

    async fn request_device(&self, filter: &DeviceFilter) -> Result<Option<PeripheralInfo>> {
        info!("Searching for devices named {}*", filter.name_prefix);
        let watcher = self.start_watcher(filter)?;
        let pick = self.picker.prompt().await;
        let _ = watcher.Stop();

        match pick {
            Some(DevicePick::Selected(address)) => Ok(Some(PeripheralInfo {
                address,
                name: String::new(),
            })),
            Some(DevicePick::Cancelled) | None => Ok(None),
        }
    }

    async fn open(
        &self,
        peripheral: &PeripheralInfo,
        service: Uuid128,
        characteristic: Uuid128,
    ) -> Result<WinRtLink> {
        info!("Connecting to Bluetooth device: {:#X}", peripheral.address);
        let device = BluetoothLEDevice::FromBluetoothAddressAsync(peripheral.address)?.await?;

        let services_result = device
            .GetGattServicesForUuidAsync(to_guid(service))?
            .await?;
        if services_result.Status()? != GattCommunicationStatus::Success {
            anyhow::bail!("Failed to get GATT services: {:?}", services_result.Status()?);
        }
        let services = services_result.Services()?;
        if services.Size()? == 0 {
            anyhow::bail!("UART service not found");
        }
        let uart = services.GetAt(0)?;

        let chars_result = uart
            .GetCharacteristicsForUuidAsync(to_guid(characteristic))?
            .await?;
        if chars_result.Status()? != GattCommunicationStatus::Success {
            anyhow::bail!("Failed to get characteristics: {:?}", chars_result.Status()?);
        }
        let characteristics = chars_result.Characteristics()?;
        if characteristics.Size()? == 0 {
            anyhow::bail!("UART RX characteristic not found");
        }
        let rx = characteristics.GetAt(0)?;
        info!("Found UART RX characteristic");

        Ok(WinRtLink { device, rx })
    }
}

#[derive(Clone)]
pub struct WinRtLink {
    device: BluetoothLEDevice,
    rx: GattCharacteristic,
}

impl BleLink for WinRtLink {
    fn name(&self) -> String {
        self.device
            .Name()
            .map(|n| n.to_string())
            .unwrap_or_default()
    }

    async fn write(&self, bytes: &[u8]) -> Result<()> {
        let writer = DataWriter::new()?;
        writer.WriteBytes(bytes)?;
        let buffer = writer.DetachBuffer()?;

        let status = self.rx.WriteValueAsync(&buffer)?.await?;
        if status != GattCommunicationStatus::Success {
            anyhow::bail!("GATT write returned {:?}", status);
        }
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        let service_closed = self.rx.Service().and_then(|s| s.Close());
        self.device.Close()?;
        service_closed?;
        Ok(())
    }

    fn on_disconnect(&self, callback: DisconnectCallback) -> Result<()> {
        let handler =
            TypedEventHandler::new(move |dev: windows::core::Ref<BluetoothLEDevice>, _| {
                if let Some(dev) = dev.as_ref() {
                    if dev.ConnectionStatus()? == BluetoothConnectionStatus::Disconnected {
                        callback();
                    }
                }
                Ok(())
            });
        self.device.ConnectionStatusChanged(&handler)?;
        Ok(())
    }
}
