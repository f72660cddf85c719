//! Event observation
//!
//! Everything the client learns outside a request/reply exchange is
//! surfaced through an [`Observer`]: unsolicited notifications, link
//! state changes, firmware transfer progress. The default
//! [`TracingObserver`] forwards events to `tracing`; embedders that
//! drive a UI install their own sink with
//! [`Device::with_observer`](crate::Device::with_observer).

use imatch_core::DeviceNotification;
use tracing::{debug, info, warn};

/// Phases of a firmware update, in the order they occur.
///
/// Fast-flash transfers skip `Commit` (the device commits on its own
/// during the reboot window); chunked transfers skip `Announce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    /// Update announced, waiting for the device to accept
    Announce,
    /// Image bytes on the wire
    Transfer,
    /// Device verifying length and checksum
    Commit,
    /// Device rebooting into the new image
    Reboot,
}

/// Events reported by a [`Device`](crate::Device)
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Link to a reader established
    Connected { uuid: String, name: String },
    /// Link torn down
    Disconnected,
    /// A notification no pending request was waiting for
    Notification(DeviceNotification),
    /// An inbound frame that did not decode
    Malformed { reason: String },
    /// Firmware bytes written so far
    FlashProgress { sent: usize, total: usize },
    /// Firmware update entered a new phase
    UpdatePhase(UpdatePhase),
}

/// Sink for device events.
///
/// Implementations must be cheap and non-blocking; events are emitted
/// from the notification dispatcher and from operation flows.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &DeviceEvent);
}

/// Observer that logs every event through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Connected { uuid, name } => info!("Connected to {} ({})", name, uuid),
            DeviceEvent::Disconnected => info!("Disconnected"),
            DeviceEvent::Notification(notification) => {
                debug!(
                    "Unsolicited notification: {}.{}",
                    notification.device, notification.method
                )
            }
            DeviceEvent::Malformed { reason } => warn!("Discarding malformed frame: {}", reason),
            DeviceEvent::FlashProgress { sent, total } => {
                debug!("Flash progress: {}/{} bytes", sent, total)
            }
            DeviceEvent::UpdatePhase(phase) => info!("Update phase: {:?}", phase),
        }
    }
}

/// Observer that discards every event
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_event(&self, _event: &DeviceEvent) {}
}
