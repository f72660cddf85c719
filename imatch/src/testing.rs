//! Shared test fixtures
//!
//! Mock-backed device construction and notification frame builders
//! used across the flow tests.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use imatch_core::DeviceNotification;
use imatch_transport::MockTransport;

use crate::device::Device;
use crate::events::{DeviceEvent, Observer};

/// Observer that records every event for later assertions
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: parking_lot::Mutex<Vec<DeviceEvent>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<DeviceEvent> {
        self.events.lock().clone()
    }

    /// Only the unsolicited notifications
    pub(crate) fn notifications(&self) -> Vec<DeviceNotification> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DeviceEvent::Notification(notification) => Some(notification),
                _ => None,
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &DeviceEvent) {
        self.events.lock().push(event.clone());
    }
}

/// A connected device over a mock transport, write log cleared
pub(crate) async fn connected() -> (Device, MockTransport, Arc<RecordingObserver>) {
    let mock = MockTransport::new();
    let observer = Arc::new(RecordingObserver::default());
    let mut device =
        Device::with_transport(Box::new(mock.clone())).with_observer(observer.clone());

    device.connect().await.expect("mock connect");
    mock.clear_writes();

    (device, mock, observer)
}

/// One notification line as transport bytes
pub(crate) fn frame(json: &str) -> Bytes {
    Bytes::from(json.to_string())
}

/// Notification frame carrying base64 binary `data`
pub(crate) fn binary_frame(device: &str, method: &str, data: &[u8]) -> Bytes {
    frame(&format!(
        r#"{{"device":"{device}","method":"{method}","data":"{}"}}"#,
        base64::encode(data)
    ))
}

/// Decode a captured JSON command write
pub(crate) fn decode_write(write: &Bytes) -> serde_json::Value {
    serde_json::from_slice(write).expect("captured write is JSON")
}

/// Let the dispatcher drain anything already queued
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
