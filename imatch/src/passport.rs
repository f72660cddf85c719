//! Passport (MRTD) reading
//!
//! The reader runs the ICAO 9303 chip session itself; the client hands
//! it the MRZ-derived access key and collects the data groups it
//! pushes back, one notification per group.

use bytes::Bytes;
use tracing::{debug, info, trace};

use imatch_core::constants::passport::{BAC_OK, DG1_HEADER_LEN};
use imatch_core::{DeviceCommand, DeviceKind, DeviceNotification, Method, NotificationPayload};
use imatch_mrz::MrzRecord;

use crate::device::Device;
use crate::error::{Error, Result};
use crate::events::DeviceEvent;

/// Result of one passport read
#[derive(Debug, Clone)]
pub struct PassportData {
    /// Parsed MRZ from DG1
    pub mrz: MrzRecord,
    /// Raw face image from DG2, as stored on the chip
    pub photo: Bytes,
}

impl Device {
    /// Read a passport presented to the contactless antenna.
    ///
    /// `access_key` is the Basic Access Control seed the reader needs
    /// to open the chip: document number, birth date and expiry date
    /// with their check digits, concatenated.
    ///
    /// The reader answers with a notification per stage: `read_bac`
    /// reports whether access control succeeded, `read_sod` is
    /// acknowledged and skipped, `read_dg1` carries the MRZ text and
    /// `read_dg2` the holder photo, which completes the read. Each
    /// stage is awaited under the request timeout.
    pub async fn read_passport(&mut self, access_key: &str) -> Result<PassportData> {
        self.ensure_connected()?;
        info!("Starting passport read");

        // Open the nfc stream before the command goes out so no data
        // group can slip past registration
        let mut stream = self.device_stream(DeviceKind::Nfc);
        let command = DeviceCommand::new(DeviceKind::Nfc, Method::MrtdRead, access_key);
        self.send_command(&command).await?;

        let mut mrz: Option<MrzRecord> = None;
        loop {
            let DeviceNotification {
                device,
                method,
                payload,
            } = self.next_from(&mut stream).await?;

            match method {
                Method::ReadBac => {
                    let NotificationPayload::Text(status) = payload else {
                        return Err(Error::UnexpectedResponse(
                            "read_bac carried no status".to_string(),
                        ));
                    };
                    if status != BAC_OK {
                        return Err(Error::BacFailed(status));
                    }
                    debug!("Access control established");
                }
                Method::ReadSod => {
                    // Passive authentication is out of scope; the
                    // security object is acknowledged and skipped
                    trace!("Skipping SOD");
                }
                Method::ReadDg1 => {
                    let NotificationPayload::Binary(data) = payload else {
                        return Err(Error::UnexpectedResponse(
                            "read_dg1 carried no data".to_string(),
                        ));
                    };
                    if data.len() < DG1_HEADER_LEN {
                        return Err(Error::Dg1TooShort { actual: data.len() });
                    }
                    let text = std::str::from_utf8(&data[DG1_HEADER_LEN..]).map_err(|_| {
                        Error::UnexpectedResponse("DG1 text is not UTF-8".to_string())
                    })?;
                    mrz = Some(imatch_mrz::parse(text)?);
                    debug!("DG1 parsed");
                }
                Method::ReadDg2 => {
                    let NotificationPayload::Binary(photo) = payload else {
                        return Err(Error::UnexpectedResponse(
                            "read_dg2 carried no data".to_string(),
                        ));
                    };
                    let Some(mrz) = mrz.take() else {
                        return Err(Error::UnexpectedResponse(
                            "DG2 arrived before DG1".to_string(),
                        ));
                    };
                    info!(
                        "Passport read complete: {} ({} byte photo)",
                        mrz.document_number,
                        photo.len()
                    );
                    return Ok(PassportData { mrz, photo });
                }
                other => {
                    // Anything else from the chip session goes down
                    // the generic path
                    self.emit(DeviceEvent::Notification(DeviceNotification {
                        device,
                        method: other,
                        payload,
                    }));
                }
            }
        }
    }
}
