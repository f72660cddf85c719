//! Transport layer for iMatch readers
//!
//! The reader's link (BLE serial in the field, a TCP serial bridge
//! here) offers exactly two primitives: write one buffer, and
//! subscribe to every inbound notification. There is no per-command
//! read; replies, unsolicited events and raw acks all arrive on the
//! single subscription stream.

pub mod error;
pub mod mock;
pub mod tcp;

pub use error::{Error, Result};
pub use mock::MockTransport;
pub use tcp::TcpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// A device visible to the transport before connecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Stable identifier used to connect
    pub uuid: String,
    /// Advertised display name
    pub name: String,
}

/// Transport trait for different link types
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the underlying link (radio, bridge) is available
    async fn is_enabled(&self) -> Result<bool>;

    /// Scan for reachable devices
    async fn list(&mut self) -> Result<Vec<DiscoveredDevice>>;

    /// Connect to a device by uuid
    async fn connect(&mut self, uuid: &str) -> Result<()>;

    /// Disconnect from the device
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Write one buffer, fire-and-forget; used both for JSON command
    /// frames and raw firmware chunks
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Subscribe to inbound notification frames
    ///
    /// There is a single subscription slot: subscribing again replaces
    /// the previous subscriber, whose receiver runs dry.
    fn subscribe(&mut self) -> Result<mpsc::Receiver<Bytes>>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
