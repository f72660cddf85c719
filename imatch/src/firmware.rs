//! Firmware update transfer
//!
//! Two transfer modes, selected by the `fastflash` capability bit:
//! newer bootloaders take raw unacknowledged 256-byte chunks at a
//! fixed 50 ms pace, older ones take base64 `flash` commands of 128
//! bytes, each acknowledged before the next goes out. Both paths end
//! with a reboot window and rediscovery. The bootloader keeps its old
//! image until a complete one is committed, so any failure aborts the
//! update and the safe recovery is to start over.

use std::fmt;

use bytes::Bytes;
use tokio::time::sleep;
use tracing::{info, trace, warn};

use imatch_core::constants::firmware::{
    CHUNKED_ACK_CHUNK, FAST_FLASH_CHUNK, FAST_FLASH_PACING, FLASH_ACK, REBOOT_WAIT,
};
use imatch_core::{DeviceCommand, DeviceKind, Method, crc32};

use crate::device::Device;
use crate::error::{Error, Result};
use crate::events::{DeviceEvent, UpdatePhase};

/// A firmware image ready for transfer
///
/// Wraps the raw bytes with their IEEE CRC-32, computed once at
/// construction.
#[derive(Debug, Clone)]
pub struct FirmwareImage {
    data: Bytes,
    checksum: u32,
}

impl FirmwareImage {
    /// Wrap an image, computing its checksum
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let checksum = crc32::calculate(&data);
        Self { data, checksum }
    }

    /// Image size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// IEEE CRC-32 over the whole image
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Raw image bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `<length>,<crc32>,0` parameter string shared by the fast-flash
    /// announce and the chunked commit
    pub fn announce_params(&self) -> String {
        format!("{},{},0", self.len(), self.checksum)
    }
}

/// How image bytes travel to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Raw unacknowledged chunks, paced by the sender
    FastFlash,
    /// Base64 `flash` commands, one ack per chunk
    ChunkedAck,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastFlash => f.write_str("fast-flash"),
            Self::ChunkedAck => f.write_str("chunked-ack"),
        }
    }
}

/// Progress bookkeeping for one transfer
struct TransferSession {
    mode: TransferMode,
    total: usize,
    sent: usize,
}

impl TransferSession {
    fn new(mode: TransferMode, total: usize) -> Self {
        Self {
            mode,
            total,
            sent: 0,
        }
    }

    fn advance(&mut self, bytes: usize) -> DeviceEvent {
        self.sent += bytes;
        trace!("{} transfer: {}/{} bytes", self.mode, self.sent, self.total);
        DeviceEvent::FlashProgress {
            sent: self.sent,
            total: self.total,
        }
    }
}

impl Device {
    /// Flash a firmware image and bring the device back up.
    ///
    /// The transfer mode comes from a fresh capability check, so an
    /// update that flips the `fastflash` bit picks the right mode on
    /// the next run. After the transfer the device reboots into the
    /// new image; this call waits out the reboot window and
    /// reconnects before returning.
    pub async fn update_firmware(&mut self, image: &FirmwareImage) -> Result<()> {
        self.ensure_connected()?;

        let info = self.info().await?;
        let mode = if info.fastflash {
            TransferMode::FastFlash
        } else {
            TransferMode::ChunkedAck
        };
        info!(
            "Updating firmware: {} bytes, crc32 {:#010x}, {} mode",
            image.len(),
            image.checksum(),
            mode
        );

        match mode {
            TransferMode::FastFlash => self.fast_flash(image).await?,
            TransferMode::ChunkedAck => {
                self.chunked_ack(image).await?;
                self.restart().await?;
            }
        }

        // The device commits and reboots; give it the full window
        // before rediscovery
        self.emit(DeviceEvent::UpdatePhase(UpdatePhase::Reboot));
        sleep(REBOOT_WAIT).await;

        if self.is_connected() {
            self.disconnect().await?;
        }
        self.connect().await?;
        info!("Firmware update complete");

        Ok(())
    }

    async fn fast_flash(&mut self, image: &FirmwareImage) -> Result<()> {
        self.emit(DeviceEvent::UpdatePhase(UpdatePhase::Announce));
        let announce = DeviceCommand::new(
            DeviceKind::Sys,
            Method::FirmwareUpdate,
            image.announce_params(),
        );
        // The device signals readiness with its next notification,
        // whatever method it picks
        self.request_any(announce).await?;

        self.emit(DeviceEvent::UpdatePhase(UpdatePhase::Transfer));
        let mut session = TransferSession::new(TransferMode::FastFlash, image.len());
        for chunk in image.data().chunks(FAST_FLASH_CHUNK) {
            self.write_raw(chunk).await?;
            let progress = session.advance(chunk.len());
            self.emit(progress);
            // Unacked mode: pacing is the only flow control
            sleep(FAST_FLASH_PACING).await;
        }

        Ok(())
    }

    async fn chunked_ack(&mut self, image: &FirmwareImage) -> Result<()> {
        self.emit(DeviceEvent::UpdatePhase(UpdatePhase::Transfer));
        let mut session = TransferSession::new(TransferMode::ChunkedAck, image.len());
        let mut offset = 0;

        for chunk in image.data().chunks(CHUNKED_ACK_CHUNK) {
            let command = DeviceCommand::new(DeviceKind::Sys, Method::Flash, base64::encode(chunk));
            let reply = self.request(command).await?;

            let acked = reply
                .payload
                .as_binary()
                .is_some_and(|bytes| bytes.len() == 1 && bytes[0] == FLASH_ACK);
            if !acked {
                warn!("Chunk at offset {} not acknowledged, aborting", offset);
                return Err(Error::FlashRejected {
                    offset,
                    response: format!("{:?}", reply.payload),
                });
            }

            offset += chunk.len();
            let progress = session.advance(chunk.len());
            self.emit(progress);
        }

        self.emit(DeviceEvent::UpdatePhase(UpdatePhase::Commit));
        // Length and checksum let the device verify before committing
        let commit = DeviceCommand::new(
            DeviceKind::Sys,
            Method::FlashLoaded,
            image.announce_params(),
        );
        self.request_any(commit).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use pretty_assertions::assert_eq;

    fn info_reply(fastflash: bool) -> Bytes {
        frame(&format!(
            r#"{{"device":"sys","method":"info","data":{{"version":"V1.2.30","fastflash":{fastflash}}}}}"#
        ))
    }

    fn flash_ack() -> Bytes {
        // "AA==" is the single ack byte 0x00
        frame(r#"{"device":"sys","method":"flash","data":"AA=="}"#)
    }

    #[test]
    fn test_image_checksum_and_announce() {
        let image = FirmwareImage::new(&b"123456789"[..]);

        assert_eq!(image.len(), 9);
        assert!(!image.is_empty());
        assert_eq!(image.checksum(), 0xCBF4_3926);
        assert_eq!(image.announce_params(), format!("9,{},0", 0xCBF4_3926_u32));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunked_transfer_acks_every_chunk() {
        let (mut device, mock, observer) = connected().await;

        let image = FirmwareImage::new(vec![0xAB; 300]);
        mock.script_reply([info_reply(false)]);
        mock.script_reply([flash_ack()]);
        mock.script_reply([flash_ack()]);
        mock.script_reply([flash_ack()]);
        mock.script_notification(r#"{"device":"sys","method":"flash_loaded","data":"ok"}"#);

        device.update_firmware(&image).await.unwrap();

        let writes = mock.writes();
        // info, three flash chunks, commit, restart, reconnect probe
        assert_eq!(writes.len(), 7);

        let chunk_sizes: Vec<usize> = writes[1..4]
            .iter()
            .map(|write| {
                let value = decode_write(write);
                assert_eq!(value["method"], "flash");
                base64::decode(value["params"].as_str().unwrap())
                    .unwrap()
                    .len()
            })
            .collect();
        assert_eq!(chunk_sizes, [128, 128, 44]);

        let commit = decode_write(&writes[4]);
        assert_eq!(commit["method"], "flash_loaded");
        assert_eq!(commit["params"], format!("300,{},0", image.checksum()));
        assert_eq!(decode_write(&writes[5])["method"], "restart");
        assert_eq!(decode_write(&writes[6])["method"], "info");

        assert!(device.is_connected());
        let events = observer.events();
        assert!(events.contains(&DeviceEvent::UpdatePhase(UpdatePhase::Transfer)));
        assert!(events.contains(&DeviceEvent::UpdatePhase(UpdatePhase::Commit)));
        assert!(events.contains(&DeviceEvent::UpdatePhase(UpdatePhase::Reboot)));
        assert!(events.contains(&DeviceEvent::FlashProgress {
            sent: 300,
            total: 300
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_chunk_aborts_the_update() {
        let (mut device, mock, _observer) = connected().await;

        let image = FirmwareImage::new(vec![0x5A; 300]);
        mock.script_reply([info_reply(false)]);
        mock.script_reply([flash_ack()]);
        // Second chunk answered with a non-ack byte
        mock.script_notification(r#"{"device":"sys","method":"flash","data":"/w=="}"#);

        let result = device.update_firmware(&image).await;

        assert!(matches!(
            result,
            Err(Error::FlashRejected { offset: 128, .. })
        ));
        // info and two flash chunks; nothing after the rejection
        assert_eq!(mock.writes().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_flash_streams_raw_chunks() {
        let (mut device, mock, observer) = connected().await;

        let image = FirmwareImage::new(vec![0xC3; 300]);
        mock.script_reply([info_reply(true)]);
        mock.script_notification(r#"{"device":"sys","method":"firmware_update","data":"ready"}"#);

        device.update_firmware(&image).await.unwrap();

        let writes = mock.writes();
        // info, announce, two raw chunks, reconnect probe
        assert_eq!(writes.len(), 5);

        let announce = decode_write(&writes[1]);
        assert_eq!(announce["method"], "firmware_update");
        assert_eq!(announce["params"], format!("300,{},0", image.checksum()));

        // Raw chunks go out without an envelope
        assert_eq!(writes[2].len(), 256);
        assert_eq!(writes[2].as_ref(), &image.data()[..256]);
        assert_eq!(writes[3].len(), 44);

        let events = observer.events();
        assert!(events.contains(&DeviceEvent::UpdatePhase(UpdatePhase::Announce)));
        assert!(events.contains(&DeviceEvent::FlashProgress {
            sent: 256,
            total: 300
        }));
        assert!(events.contains(&DeviceEvent::FlashProgress {
            sent: 300,
            total: 300
        }));
        assert!(device.is_connected());
    }
}
