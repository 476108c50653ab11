//! Print what a PIV token exposes without a PIN
//!
//! Usage: `RUST_LOG=pivkey=debug cargo run --example piv_info [reader-prefix]`

use pivkey::constants::{objects, pin_banks, slots};
use pivkey::tlv::Node;
use pivkey::{PcscConfig, PivCard, PivConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prefix = std::env::args().nth(1);
    let pcsc_config = match prefix {
        Some(prefix) => PcscConfig::default().with_reader_prefix(Some(prefix)),
        None => PcscConfig::default(),
    };

    let mut card = PivCard::open_pcsc(&pcsc_config, PivConfig::default())?;
    println!("Reader: {}", card.transport().reader_name());
    match card.transport().atr() {
        Ok(atr) => println!("ATR: {}", hex::encode_upper(atr)),
        Err(e) => println!("ATR unavailable: {e}"),
    }

    match card.is_locked(pin_banks::PIV_PIN) {
        Ok(locked) => println!("PIN locked: {locked}"),
        Err(e) => println!("PIN status unavailable: {e}"),
    }

    match card.get_data(objects::CHUID) {
        Ok(Node::Leaf(chuid)) => println!("CHUID: {}", hex::encode_upper(chuid)),
        Ok(other) => println!("CHUID: {other:?}"),
        Err(e) => println!("CHUID unavailable: {e}"),
    }

    for slot in [
        slots::AUTHENTICATION,
        slots::SIGNATURE,
        slots::KEY_MANAGEMENT,
        slots::CARD_AUTHENTICATION,
    ] {
        match card.read_certificate(slot) {
            Ok(cert) => println!(
                "Slot {slot:02X}: certificate of {} bytes{}",
                cert.der.len(),
                if cert.compressed { " (gzip)" } else { "" }
            ),
            Err(e) => println!("Slot {slot:02X}: {e}"),
        }
    }

    card.close();
    Ok(())
}
