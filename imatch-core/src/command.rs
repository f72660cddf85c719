//! iMatch command envelopes
//!
//! Every command is one JSON object on the wire:
//!
//! ```json
//! {"imatch":"1.0","device":"sys","method":"info","params":""}
//! ```
//!
//! Commands are fire-and-forget; the device carries no correlation id
//! and replies echo the `(device, method)` pair instead.

use std::fmt;

use bytes::Bytes;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::constants::PROTOCOL_VERSION;
use crate::error::{Error, Result};

/// Target peripheral inside the reader
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// System controller: info, clock, battery, firmware
    Sys,
    /// Fingerprint sensor
    Fpr,
    /// Contactless passport (MRTD) reader
    Nfc,
    /// Contact smartcard reader
    Scr,
}

impl DeviceKind {
    /// Wire selector
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sys => "sys",
            Self::Fpr => "fpr",
            Self::Nfc => "nfc",
            Self::Scr => "scr",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DeviceKind {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "sys" => Ok(Self::Sys),
            "fpr" => Ok(Self::Fpr),
            "nfc" => Ok(Self::Nfc),
            "scr" => Ok(Self::Scr),
            other => Err(Error::UnknownDevice(other.to_string())),
        }
    }
}

impl Serialize for DeviceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Protocol method
///
/// Closed set of the methods the reader speaks, with [`Method::Other`]
/// carrying anything a newer firmware may add; unknown methods are
/// surfaced to callers, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    // sys
    Info,
    Status,
    Datetime,
    Restart,
    FirmwareUpdate,
    Flash,
    FlashLoaded,
    // fpr / scr
    PowerOn,
    PowerOff,
    Send,
    Notify,
    // nfc
    MrtdRead,
    ReadBac,
    ReadSod,
    ReadDg1,
    ReadDg2,
    // scr results
    ReadPhoto,
    ReadCertificate,
    /// Any method outside the known set, kept verbatim
    Other(String),
}

impl Method {
    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "info",
            Self::Status => "status",
            Self::Datetime => "datetime",
            Self::Restart => "restart",
            Self::FirmwareUpdate => "firmware_update",
            Self::Flash => "flash",
            Self::FlashLoaded => "flash_loaded",
            Self::PowerOn => "power_on",
            Self::PowerOff => "power_off",
            Self::Send => "send",
            Self::Notify => "notify",
            Self::MrtdRead => "mrtdread",
            Self::ReadBac => "read_bac",
            Self::ReadSod => "read_sod",
            Self::ReadDg1 => "read_dg1",
            Self::ReadDg2 => "read_dg2",
            Self::ReadPhoto => "read_photo",
            Self::ReadCertificate => "read_certificate",
            Self::Other(name) => name,
        }
    }

    /// Decode a wire name; never fails, unrecognized names land in
    /// [`Method::Other`]
    pub fn from_wire(name: &str) -> Self {
        match name {
            "info" => Self::Info,
            "status" => Self::Status,
            "datetime" => Self::Datetime,
            "restart" => Self::Restart,
            "firmware_update" => Self::FirmwareUpdate,
            "flash" => Self::Flash,
            "flash_loaded" => Self::FlashLoaded,
            "power_on" => Self::PowerOn,
            "power_off" => Self::PowerOff,
            "send" => Self::Send,
            "notify" => Self::Notify,
            "mrtdread" => Self::MrtdRead,
            "read_bac" => Self::ReadBac,
            "read_sod" => Self::ReadSod,
            "read_dg1" => Self::ReadDg1,
            "read_dg2" => Self::ReadDg2,
            "read_photo" => Self::ReadPhoto,
            "read_certificate" => Self::ReadCertificate,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether inbound `data` for this method is a base64 binary blob
    pub fn carries_binary(&self) -> bool {
        matches!(
            self,
            Self::Notify
                | Self::Flash
                | Self::ReadSod
                | Self::ReadDg1
                | Self::ReadDg2
                | Self::ReadPhoto
                | Self::ReadCertificate
        )
    }

    /// Whether inbound `data` for this method is a scalar string
    pub fn carries_text(&self) -> bool {
        matches!(self, Self::Datetime | Self::ReadBac)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A command envelope, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommand {
    /// Target peripheral
    pub device: DeviceKind,
    /// Method name
    pub method: Method,
    /// Pre-formatted parameter string; empty when the method takes
    /// none
    pub params: String,
}

impl DeviceCommand {
    /// Build a command
    pub fn new(device: DeviceKind, method: Method, params: impl Into<String>) -> Self {
        Self {
            device,
            method,
            params: params.into(),
        }
    }

    /// Encode as a newline-terminated JSON frame
    pub fn encode(&self) -> Result<Bytes> {
        let mut frame = serde_json::to_vec(self)?;
        frame.push(b'\n');
        Ok(Bytes::from(frame))
    }
}

impl Serialize for DeviceCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("DeviceCommand", 4)?;
        envelope.serialize_field("imatch", PROTOCOL_VERSION)?;
        envelope.serialize_field("device", &self.device)?;
        envelope.serialize_field("method", &self.method)?;
        envelope.serialize_field("params", &self.params)?;
        envelope.end()
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.device, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_envelope_shape() {
        let cmd = DeviceCommand::new(DeviceKind::Sys, Method::Info, "");
        let frame = cmd.encode().unwrap();

        assert_eq!(
            std::str::from_utf8(&frame).unwrap(),
            "{\"imatch\":\"1.0\",\"device\":\"sys\",\"method\":\"info\",\"params\":\"\"}\n"
        );
    }

    #[test]
    fn test_envelope_with_params() {
        let cmd = DeviceCommand::new(DeviceKind::Sys, Method::FirmwareUpdate, "1024,305419896,0");
        let frame = cmd.encode().unwrap();
        let text = std::str::from_utf8(&frame).unwrap();

        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["imatch"], "1.0");
        assert_eq!(value["device"], "sys");
        assert_eq!(value["method"], "firmware_update");
        assert_eq!(value["params"], "1024,305419896,0");
    }

    #[test]
    fn test_method_wire_names_round_trip() {
        for method in [
            Method::Info,
            Method::Status,
            Method::Datetime,
            Method::Restart,
            Method::FirmwareUpdate,
            Method::Flash,
            Method::FlashLoaded,
            Method::PowerOn,
            Method::PowerOff,
            Method::Send,
            Method::Notify,
            Method::MrtdRead,
            Method::ReadBac,
            Method::ReadSod,
            Method::ReadDg1,
            Method::ReadDg2,
            Method::ReadPhoto,
            Method::ReadCertificate,
        ] {
            assert_eq!(Method::from_wire(method.as_str()), method);
        }
    }

    #[test]
    fn test_unknown_method_is_preserved() {
        let method = Method::from_wire("selftest");
        assert_eq!(method, Method::Other("selftest".to_string()));
        assert_eq!(method.as_str(), "selftest");
        assert!(!method.carries_binary());
    }

    #[test]
    fn test_device_kind_from_wire() {
        assert_eq!(DeviceKind::try_from("nfc").unwrap(), DeviceKind::Nfc);
        assert!(matches!(
            DeviceKind::try_from("uart"),
            Err(Error::UnknownDevice(s)) if s == "uart"
        ));
    }

    #[test]
    fn test_display() {
        let cmd = DeviceCommand::new(DeviceKind::Fpr, Method::PowerOn, "");
        assert_eq!(cmd.to_string(), "fpr.power_on");
    }
}
