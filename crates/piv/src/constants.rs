//! PIV application identifiers, instruction bytes and well known values

/// Application identifier of the PIV applet
pub const PIV_AID: &[u8] = b"\xA0\x00\x00\x03\x08\x00\x00\x10\x00\x01\x00";

/// Interindustry class byte
pub const CLA_ISO: u8 = 0x00;

/// Instruction bytes
pub mod ins {
    /// SELECT
    pub const SELECT: u8 = 0xA4;
    /// VERIFY
    pub const VERIFY: u8 = 0x20;
    /// GET DATA
    pub const GET_DATA: u8 = 0xCB;
    /// GENERATE ASYMMETRIC KEY PAIR
    pub const GENERATE_ASYMMETRIC: u8 = 0x47;
    /// GENERAL AUTHENTICATE
    pub const GENERAL_AUTHENTICATE: u8 = 0x87;
}

/// SELECT by application identifier
pub const P1_SELECT_BY_AID: u8 = 0x04;

/// GET DATA parameters addressing the current application
pub const P1P2_GET_DATA: (u8, u8) = (0x3F, 0xFF);

/// Length of the VERIFY data field
pub const PIN_BLOCK_LEN: usize = 8;

/// Padding byte after the PIN in the VERIFY data field
pub const PIN_PADDING: u8 = 0xFF;

/// References for VERIFY
pub mod pin_banks {
    /// Global PIN
    pub const GLOBAL: u8 = 0x00;
    /// PIV application PIN
    pub const PIV_PIN: u8 = 0x80;
    /// PIN unblocking key
    pub const PUK: u8 = 0x81;
}

/// Key references
pub mod slots {
    /// PIV authentication key
    pub const AUTHENTICATION: u8 = 0x9A;
    /// Digital signature key
    pub const SIGNATURE: u8 = 0x9C;
    /// Key management key
    pub const KEY_MANAGEMENT: u8 = 0x9D;
    /// Card authentication key
    pub const CARD_AUTHENTICATION: u8 = 0x9E;
}

/// Cryptographic mechanism identifiers
pub mod algorithms {
    /// RSA 1024
    pub const RSA_1024: u8 = 0x06;
    /// RSA 2048
    pub const RSA_2048: u8 = 0x07;
    /// ECC P-256
    pub const ECC_P256: u8 = 0x11;
    /// ECC P-384
    pub const ECC_P384: u8 = 0x14;
}

/// Data object identifiers used as GET DATA paths
pub mod objects {
    /// Card holder unique identifier
    pub const CHUID: &[u8] = &[0x5F, 0xC1, 0x02];
    /// Card capability container
    pub const CAPABILITY_CONTAINER: &[u8] = &[0x5F, 0xC1, 0x07];
    /// X.509 certificate for PIV authentication (slot 9A)
    pub const CERT_AUTHENTICATION: &[u8] = &[0x5F, 0xC1, 0x05];
    /// X.509 certificate for digital signature (slot 9C)
    pub const CERT_SIGNATURE: &[u8] = &[0x5F, 0xC1, 0x0A];
    /// X.509 certificate for key management (slot 9D)
    pub const CERT_KEY_MANAGEMENT: &[u8] = &[0x5F, 0xC1, 0x0B];
    /// X.509 certificate for card authentication (slot 9E)
    pub const CERT_CARD_AUTHENTICATION: &[u8] = &[0x5F, 0xC1, 0x01];
    /// Discovery object
    pub const DISCOVERY: &[u8] = &[0x7E];

    /// Certificate object for a key reference
    pub const fn certificate_for_slot(slot: u8) -> Option<&'static [u8]> {
        match slot {
            super::slots::AUTHENTICATION => Some(CERT_AUTHENTICATION),
            super::slots::SIGNATURE => Some(CERT_SIGNATURE),
            super::slots::KEY_MANAGEMENT => Some(CERT_KEY_MANAGEMENT),
            super::slots::CARD_AUTHENTICATION => Some(CERT_CARD_AUTHENTICATION),
            _ => None,
        }
    }
}

/// Tags of the data objects exchanged with the applet
pub mod tags {
    use crate::tlv::Tag;

    /// Tag list in a GET DATA command
    pub const TAG_LIST: Tag = Tag::from_raw(0x5C);
    /// Wrapper of every data object returned by GET DATA
    pub const DATA: Tag = Tag::from_raw(0x53);
    /// Certificate inside a certificate data object
    pub const CERTIFICATE: Tag = Tag::from_raw(0x70);
    /// Certificate info byte; bit 0 set when the certificate is gzip compressed
    pub const CERT_INFO: Tag = Tag::from_raw(0x71);

    /// Control reference template of GENERATE ASYMMETRIC KEY PAIR
    pub const CONTROL_REFERENCE: Tag = Tag::from_raw(0xAC);
    /// Cryptographic mechanism inside the control reference template
    pub const MECHANISM: Tag = Tag::from_raw(0x80);
    /// Parameter inside the control reference template
    pub const PARAMETER: Tag = Tag::from_raw(0xAB);
    /// Public key template returned by GENERATE ASYMMETRIC KEY PAIR
    pub const PUBLIC_KEY: Tag = Tag::from_raw(0x7F49);
    /// RSA modulus
    pub const RSA_MODULUS: Tag = Tag::from_raw(0x81);
    /// RSA public exponent
    pub const RSA_EXPONENT: Tag = Tag::from_raw(0x82);
    /// Elliptic curve point
    pub const EC_POINT: Tag = Tag::from_raw(0x86);

    /// Dynamic authentication template of GENERAL AUTHENTICATE
    pub const DYNAMIC_AUTH: Tag = Tag::from_raw(0x7C);
    /// Challenge (the data to sign)
    pub const CHALLENGE: Tag = Tag::from_raw(0x81);
    /// Response (the signature)
    pub const RESPONSE: Tag = Tag::from_raw(0x82);
}

/// Value of the parameter object in the control reference template
pub const GENERATE_PARAMETER: u8 = 0x02;

/// Settle time after SELECT, in milliseconds
pub const SELECT_DELAY_MS: u64 = 250;
