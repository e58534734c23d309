//! Bluetooth Module
//!
//! BLE link to the roulette device.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    BluetoothService                      │
//! │   (worker thread - turns UI commands into channel calls) │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!                       ▼
//!              ┌─────────────────┐        ┌──────────┐
//!              │ ControlChannel  │───────▶│ Protocol │
//!              │ - session state │        │ - UUIDs  │
//!              │ - START frames  │        │ - frames │
//!              └────────┬────────┘        └──────────┘
//!                       │ BleTransport / BleLink
//!            ┌──────────┴──────────┐
//!            ▼                     ▼
//!     ┌─────────────┐      ┌──────────────┐
//!     │ WinRT       │      │ Unsupported  │
//!     │ (Windows)   │      │ (elsewhere)  │
//!     └─────────────┘      └──────────────┘
//! ```

pub mod channel;
pub mod picker;
pub mod protocol;
pub mod service;
pub mod transport;

#[cfg(not(windows))]
pub mod unsupported;
#[cfg(windows)]
pub mod winrt;

pub use picker::DevicePicker;
pub use service::BluetoothService;

#[cfg(windows)]
pub type PlatformTransport = winrt::WinRtTransport;
#[cfg(not(windows))]
pub type PlatformTransport = unsupported::NoBluetooth;
