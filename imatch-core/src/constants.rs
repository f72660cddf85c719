//! Protocol constants

use std::time::Duration;

/// Envelope version marker carried in every command
pub const PROTOCOL_VERSION: &str = "1.0";

/// Default reply timeout for request/response commands
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Firmware transfer parameters
pub mod firmware {
    use super::Duration;

    /// Raw chunk size for unacknowledged fast-flash streaming (bytes)
    pub const FAST_FLASH_CHUNK: usize = 256;

    /// Pacing delay between fast-flash chunks; the device has no flow
    /// control on this path
    pub const FAST_FLASH_PACING: Duration = Duration::from_millis(50);

    /// Payload size per acknowledged `flash` command (bytes)
    pub const CHUNKED_ACK_CHUNK: usize = 128;

    /// Single-byte payload acknowledging a `flash` chunk
    /// (base64 wire form `"AA=="`)
    pub const FLASH_ACK: u8 = 0x00;

    /// Flash-commit plus reboot time before the device can be
    /// rediscovered
    pub const REBOOT_WAIT: Duration = Duration::from_secs(15);
}

/// Fingerprint sensor parameters
pub mod fingerprint {
    use super::Duration;

    /// Settle time between sensor power-on and the capture command
    pub const WARMUP: Duration = Duration::from_secs(1);

    /// WSQ capture command blob, sent base64-encoded as `fpr.send`
    /// params
    pub const WSQ_CAPTURE_COMMAND: &[u8] = &[
        0x21, 0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x34, 0x04, 0x00,
        0x05, 0x00, 0x00, 0x00, 0x3D, 0x06, 0x00, 0x00, 0x3E, 0x02, 0x00, 0x9C, 0x0F,
    ];

    /// Leading byte of a sensor status notification
    pub const STATUS_MARKER: u8 = 0x71;

    /// Leading byte of a captured template notification
    pub const TEMPLATE_MARKER: u8 = 0x21;
}

/// Smartcard parameters
pub mod smartcard {
    /// `scr.power_on` params selecting ATR-based card detection
    pub const READ_KNOWN_ATRS: &str = "readKnownATRs";
}

/// Passport (MRTD) parameters
pub mod passport {
    /// `read_bac` data value reporting successful access control
    pub const BAC_OK: &str = "1";

    /// Data-group header length preceding the MRZ text in `read_dg1`
    /// payloads
    pub const DG1_HEADER_LEN: usize = 3;
}
