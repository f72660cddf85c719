//! # imatch-core
//!
//! Protocol primitives for iMatch document readers.
//!
//! This crate provides the low-level protocol pieces:
//! - Command envelope encoding
//! - Notification envelope decoding with typed payloads
//! - CRC-32 checksums for firmware transfers
//! - Session lifecycle and correlation ids
//! - Protocol constants

pub mod command;
pub mod constants;
pub mod crc32;
pub mod error;
pub mod notification;
pub mod session;

pub use command::{DeviceCommand, DeviceKind, Method};
pub use constants::{DEFAULT_REQUEST_TIMEOUT, PROTOCOL_VERSION};
pub use error::{Error, Result};
pub use notification::{DeviceNotification, NotificationPayload};
pub use session::{Session, SessionState};
