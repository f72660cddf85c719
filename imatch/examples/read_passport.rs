//! Read a passport: access control, MRZ and photo

use imatch::Device;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let addr = std::env::var("IMATCH_ADDR").unwrap_or_else(|_| "192.168.4.1".to_string());
    // Document number, birth date and expiry date with their check
    // digits, straight from the printed MRZ
    let access_key =
        std::env::var("MRZ_KEY").unwrap_or_else(|_| "L898902C3674081221204159".to_string());

    let mut device = Device::new(addr, 3333);
    device.connect().await?;

    println!("Present a passport to the antenna...");
    let passport = device.read_passport(&access_key).await?;

    let mrz = &passport.mrz;
    println!("Document:    {} ({})", mrz.document_number, mrz.issuing_state);
    println!("Holder:      {}", mrz.name.full());
    println!("Nationality: {}", mrz.nationality);
    println!("Born:        {}", mrz.birth_date);
    println!("Expires:     {}", mrz.expiry_date);
    println!(
        "Checks:      {}",
        if mrz.is_valid() { "all valid" } else { "FAILED" }
    );
    println!("Photo:       {} bytes", passport.photo.len());

    std::fs::write("photo.jp2", &passport.photo)?;
    println!("Photo written to photo.jp2");

    device.disconnect().await?;
    Ok(())
}
