//! Inbound notification envelopes
//!
//! The reader pushes JSON notifications over its single subscription
//! channel; each names the originating device and the method it
//! answers (or announces) plus method-specific `data`. There is no
//! correlation id on the wire, so callers match replies by the echoed
//! `(device, method)` pair.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use imatch_types::{BatteryStatus, DeviceInfo};

use crate::command::{DeviceKind, Method};
use crate::error::{Error, Result};

/// Wire shape before method-specific decoding
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    device: String,
    method: String,
    #[serde(default)]
    data: Value,
}

/// One decoded notification
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceNotification {
    /// Originating peripheral
    pub device: DeviceKind,
    /// Method this notification answers or announces
    pub method: Method,
    /// Decoded method-specific data
    pub payload: NotificationPayload,
}

/// Method-specific notification data
///
/// Closed union: methods with a known shape decode to typed variants,
/// everything else is kept verbatim in [`NotificationPayload::Json`]
/// so nothing the device says is ever dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationPayload {
    /// `info` — firmware version and capability flags
    Info(DeviceInfo),
    /// `status` — battery report
    Status(BatteryStatus),
    /// Scalar string data (`datetime`, `read_bac`)
    Text(String),
    /// Base64-decoded binary data (sensor frames, data groups, flash
    /// acks)
    Binary(Bytes),
    /// Any other method's data, verbatim
    Json(Value),
}

impl DeviceNotification {
    /// Decode one notification frame
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let wire: WireEnvelope = serde_json::from_slice(frame)?;
        let device = DeviceKind::try_from(wire.device.as_str())?;
        let method = Method::from_wire(&wire.method);
        let payload = NotificationPayload::decode(&method, wire.data)?;

        trace!(device = %device, method = %method, "Decoded notification");

        Ok(Self {
            device,
            method,
            payload,
        })
    }
}

impl NotificationPayload {
    fn decode(method: &Method, data: Value) -> Result<Self> {
        match method {
            Method::Info => Ok(Self::Info(serde_json::from_value(data)?)),
            Method::Status => Ok(Self::Status(serde_json::from_value(data)?)),
            m if m.carries_text() => match data {
                Value::String(text) => Ok(Self::Text(text)),
                _ => Err(Error::Payload {
                    method: method.to_string(),
                    expected: "string",
                }),
            },
            m if m.carries_binary() => match data {
                Value::String(encoded) => Ok(Self::Binary(Bytes::from(base64::decode(&encoded)?))),
                _ => Err(Error::Payload {
                    method: method.to_string(),
                    expected: "base64 string",
                }),
            },
            _ => Ok(Self::Json(data)),
        }
    }

    /// Binary bytes when this payload is [`NotificationPayload::Binary`]
    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// String slice when this payload is [`NotificationPayload::Text`]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}
