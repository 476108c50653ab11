//! PIN validation and the VERIFY data field

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{PIN_BLOCK_LEN, PIN_PADDING};
use crate::{Error, Result};

/// Check that `pin` fits the VERIFY data field
///
/// A PIN is at most eight ASCII characters. The empty string is valid and
/// means "probe without spending a retry".
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() > PIN_BLOCK_LEN {
        return Err(Error::InvalidArgument(format!(
            "PIN is {} characters long, at most {PIN_BLOCK_LEN} are allowed",
            pin.len()
        )));
    }
    if !pin.is_ascii() {
        return Err(Error::InvalidArgument(
            "PIN contains non-ASCII characters".to_string(),
        ));
    }
    Ok(())
}

/// PIN padded to eight bytes with `FF`, wiped on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct PinBlock([u8; PIN_BLOCK_LEN]);

impl PinBlock {
    pub(crate) fn new(pin: &str) -> Result<Self> {
        validate_pin(pin)?;
        let mut block = [PIN_PADDING; PIN_BLOCK_LEN];
        block[..pin.len()].copy_from_slice(pin.as_bytes());
        Ok(Self(block))
    }
}

impl AsRef<[u8]> for PinBlock {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PinBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinBlock(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding() {
        let block = PinBlock::new("123456").unwrap();
        assert_eq!(block.as_ref(), &[0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0xFF, 0xFF]);

        let block = PinBlock::new("12345678").unwrap();
        assert_eq!(block.as_ref(), b"12345678");
    }

    #[test]
    fn test_rejects_bad_pins() {
        assert!(matches!(validate_pin("123456789"), Err(Error::InvalidArgument(_))));
        assert!(matches!(validate_pin("12345é"), Err(Error::InvalidArgument(_))));
        assert!(validate_pin("").is_ok());
    }

    #[test]
    fn test_debug_hides_pin() {
        let block = PinBlock::new("123456").unwrap();
        assert_eq!(format!("{block:?}"), "PinBlock(..)");
    }
}
