//! Connect to a reader and print its firmware and battery reports

use imatch::Device;

#[tokio::main]
async fn main() -> imatch::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Address of the BLE/TCP serial bridge
    let addr = std::env::var("IMATCH_ADDR").unwrap_or_else(|_| "192.168.4.1".to_string());

    println!("Connecting to {}...", addr);
    let mut device = Device::new(addr, 3333);
    device.connect().await?;
    println!("✓ Connected");

    let info = device.info().await?;
    println!("✓ Firmware: {} (fastflash: {})", info.version, info.fastflash);

    let battery = device.battery_status().await?;
    println!("✓ Battery: {}%", battery.cv);

    device.disconnect().await?;
    println!("✓ Disconnected");

    Ok(())
}
