//! Device information structures

use std::fmt;

use serde::Deserialize;

/// Device information, as reported by the `sys.info` notification.
///
/// Older firmware revisions omit the `fastflash` capability flag; absence
/// means the device only supports the per-chunk acknowledged flash protocol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceInfo {
    /// Firmware version string, e.g. `"V1.9.4.8"`
    pub version: String,

    /// Device supports the unacknowledged fast-flash firmware stream
    #[serde(default)]
    pub fastflash: bool,
}

impl DeviceInfo {
    pub fn new(version: impl Into<String>, fastflash: bool) -> Self {
        Self {
            version: version.into(),
            fastflash,
        }
    }

    /// Version string without the vendor revision prefix.
    ///
    /// The reader reports versions like `"V1.9.4.8"`; comparisons against a
    /// target release are done on the numeric part only.
    pub fn semantic_version(&self) -> &str {
        self.version
            .trim_start_matches(|c: char| !c.is_ascii_digit())
    }

    /// Whether the installed firmware differs from `target`.
    ///
    /// `target` is compared against [`Self::semantic_version`], so either
    /// `"1.9.4.8"` or `"V1.9.4.8"` works.
    pub fn needs_update(&self, target: &str) -> bool {
        let target = target.trim_start_matches(|c: char| !c.is_ascii_digit());
        self.semantic_version() != target
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iMatch[FW: {}, fastflash: {}]",
            self.version, self.fastflash
        )
    }
}

/// Battery status, as reported by the `sys.status` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BatteryStatus {
    /// Charge value in percent
    pub cv: u8,
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.cv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_strips_prefix() {
        let info = DeviceInfo::new("V1.9.4.8", true);
        assert_eq!(info.semantic_version(), "1.9.4.8");
    }

    #[test]
    fn test_semantic_version_without_prefix() {
        let info = DeviceInfo::new("1.9.4.8", false);
        assert_eq!(info.semantic_version(), "1.9.4.8");
    }

    #[test]
    fn test_needs_update() {
        let info = DeviceInfo::new("V1.9.4.8", true);
        assert!(info.needs_update("1.9.4.9"));
        assert!(!info.needs_update("1.9.4.8"));
        assert!(!info.needs_update("V1.9.4.8"));
    }

    #[test]
    fn test_deserialize_info_payload() {
        let info: DeviceInfo =
            serde_json::from_str(r#"{"version":"V1.9.4.8","fastflash":true}"#).unwrap();
        assert_eq!(info.version, "V1.9.4.8");
        assert!(info.fastflash);
    }

    #[test]
    fn test_deserialize_without_fastflash() {
        // Older firmware does not report the capability flag.
        let info: DeviceInfo = serde_json::from_str(r#"{"version":"V1.8.0.1"}"#).unwrap();
        assert!(!info.fastflash);
    }

    #[test]
    fn test_deserialize_status_payload() {
        let status: BatteryStatus = serde_json::from_str(r#"{"cv":87}"#).unwrap();
        assert_eq!(status.cv, 87);
        assert_eq!(status.to_string(), "87%");
    }
}
