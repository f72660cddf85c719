//! Fingerprint capture
//!
//! The sensor answers a capture command with a stream of `notify`
//! frames; the first payload byte tells status frames (0x71) apart
//! from the final WSQ-compressed template (0x21).

use bytes::Bytes;
use tokio::time::sleep;
use tracing::{debug, info};

use imatch_core::constants::fingerprint::{
    STATUS_MARKER, TEMPLATE_MARKER, WARMUP, WSQ_CAPTURE_COMMAND,
};
use imatch_core::{DeviceCommand, DeviceKind, Method, NotificationPayload};

use crate::device::Device;
use crate::error::Result;
use crate::events::DeviceEvent;

impl Device {
    /// Capture a fingerprint and return the WSQ-compressed template.
    ///
    /// Powers the sensor, waits out its warmup, then issues the
    /// capture command and follows the `notify` stream until the
    /// template frame arrives. Status frames along the way are
    /// surfaced to the observer; the sensor is powered off once the
    /// template is in.
    pub async fn capture_fingerprint(&mut self) -> Result<Bytes> {
        self.ensure_connected()?;
        info!("Powering fingerprint sensor");

        let mut stream = self.device_stream(DeviceKind::Fpr);
        self.request(DeviceCommand::new(DeviceKind::Fpr, Method::PowerOn, ""))
            .await?;

        // Sensor needs a beat after power-on before it takes commands
        sleep(WARMUP).await;

        debug!("Requesting WSQ capture");
        let capture = base64::encode(WSQ_CAPTURE_COMMAND);
        self.send_command(&DeviceCommand::new(DeviceKind::Fpr, Method::Send, capture))
            .await?;

        loop {
            let notification = self.next_from(&mut stream).await?;
            if notification.method != Method::Notify {
                self.emit(DeviceEvent::Notification(notification));
                continue;
            }

            let data = match &notification.payload {
                NotificationPayload::Binary(bytes) => bytes.clone(),
                _ => {
                    self.emit(DeviceEvent::Notification(notification));
                    continue;
                }
            };

            match data.first().copied() {
                Some(STATUS_MARKER) => {
                    debug!("Sensor status: {}", hex::encode(&data));
                    self.emit(DeviceEvent::Notification(notification));
                }
                Some(TEMPLATE_MARKER) => {
                    info!("Template captured ({} bytes)", data.len());
                    self.send_command(&DeviceCommand::new(DeviceKind::Fpr, Method::PowerOff, ""))
                        .await?;
                    return Ok(data);
                }
                _ => self.emit(DeviceEvent::Notification(notification)),
            }
        }
    }
}
