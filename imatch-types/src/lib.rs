//! Type definitions for imatch

pub mod device_info;

pub use device_info::{BatteryStatus, DeviceInfo};
