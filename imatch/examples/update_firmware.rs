//! Flash a firmware image from a file

use imatch::{Device, FirmwareImage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: update_firmware <image.bin> [version]"))?;
    let target_version = std::env::args().nth(2);
    let addr = std::env::var("IMATCH_ADDR").unwrap_or_else(|_| "192.168.4.1".to_string());

    let image = FirmwareImage::new(std::fs::read(&path)?);
    println!(
        "Image: {} bytes, crc32 {:#010x}",
        image.len(),
        image.checksum()
    );

    let mut device = Device::new(addr, 3333);
    device.connect().await?;

    let info = device.info().await?;
    println!("Reader reports firmware {}", info.version);
    if let Some(target) = target_version {
        if !info.needs_update(&target) {
            println!("✓ Already running {}, nothing to flash", target);
            device.disconnect().await?;
            return Ok(());
        }
        println!("Updating {} -> {}", info.version, target);
    }

    println!("Flashing (do not power off the reader)...");
    device.update_firmware(&image).await?;
    println!("✓ Update complete, device back online");

    device.disconnect().await?;
    Ok(())
}
