//! # imatch
//!
//! Async client for iMatch biometric document readers: combined
//! passport (MRTD), fingerprint and smartcard devices attached over a
//! BLE/TCP serial bridge speaking a line-delimited JSON protocol.
//!
//! ## Features
//!
//! - Reader discovery, connection management and reconnection
//! - Request/response matching over a correlation-free wire protocol
//! - Passport reads: access control, DG1 (MRZ) and DG2 (photo)
//! - ICAO 9303 TD3 MRZ parsing with full check-digit verification
//! - Fingerprint capture returning WSQ-compressed templates
//! - Firmware updates in fast-flash and chunked-ack transfer modes
//!
//! ## Quick Start
//!
//! ```no_run
//! use imatch::Device;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reader reachable through a BLE/TCP serial bridge
//!     let mut device = Device::new("192.168.4.1", 3333);
//!     device.connect().await?;
//!
//!     let info = device.info().await?;
//!     println!("firmware {} (fastflash: {})", info.version, info.fastflash);
//!
//!     let passport = device.read_passport("L898902C3674081221204159").await?;
//!     println!("holder: {}", passport.mrz.name.full());
//!
//!     device.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The workspace splits into focused crates:
//!
//! - `imatch` - high-level [`Device`] client and operation flows
//! - `imatch-core` - protocol envelopes, session and checksums
//! - `imatch-mrz` - standalone ICAO 9303 TD3 MRZ parser
//! - `imatch-transport` - transport trait, TCP bridge and test mock
//! - `imatch-types` - shared device data types

pub mod device;
pub mod error;
pub mod events;
pub mod firmware;
pub mod passport;

mod fingerprint;

#[cfg(test)]
pub(crate) mod testing;

pub use device::Device;
pub use error::{Error, Result};
pub use events::{DeviceEvent, NullObserver, Observer, TracingObserver, UpdatePhase};
pub use firmware::{FirmwareImage, TransferMode};
pub use passport::PassportData;

pub use imatch_core::{DeviceCommand, DeviceKind, DeviceNotification, Method, NotificationPayload};
pub use imatch_mrz::MrzRecord;
pub use imatch_transport::{DiscoveredDevice, TcpTransport, Transport};
pub use imatch_types::{BatteryStatus, DeviceInfo};
