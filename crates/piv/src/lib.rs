//! Command layer for PIV smart card tokens
//!
//! [`PivCard`] speaks ISO 7816-4 APDUs to the PIV applet of a token: it
//! selects the applet, verifies PINs, reads data objects, generates key pairs
//! and signs prepared digests. Oversized commands are chained and `61 XX`
//! replies are drained by the executor in `pivkey-apdu-core`; replies are
//! decoded with the BER-TLV codec in [`tlv`].
//!
//! ```no_run
//! # fn main() -> pivkey::Result<()> {
//! use pivkey::constants::{algorithms, pin_banks, slots};
//! use pivkey::{PcscConfig, PivCard, PivConfig};
//!
//! let mut card = PivCard::open_pcsc(&PcscConfig::default(), PivConfig::default())?;
//! if !card.is_locked(pin_banks::PIV_PIN)? {
//!     card.verify_pin(pin_banks::PIV_PIN, "123456")?;
//!     let signature = card.sign(slots::SIGNATURE, algorithms::ECC_P256, &[0u8; 32])?;
//!     println!("{}", hex::encode(signature));
//! }
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

mod card;
mod config;
pub mod constants;
mod error;
mod pin;
pub mod tlv;
mod types;

pub use card::PivCard;
pub use config::{DEFAULT_SELECT_DELAY, PivConfig};
pub use error::{Error, Result};
pub use pin::validate_pin;
pub use types::{PublicKey, StoredCertificate};

pub use pivkey_apdu_core::{Bytes, CardTransport, StatusWord, TransportError};

#[cfg(feature = "pcsc")]
pub use pivkey_apdu_transport_pcsc::{PcscConfig, PcscDeviceManager, PcscTransport};
