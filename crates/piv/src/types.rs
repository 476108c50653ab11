//! Views over decoded replies

use bytes::Bytes;

use crate::constants::tags;
use crate::tlv::{self, Node};
use crate::{Error, Result};

/// Public half of a key generated on the token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// RSA key
    Rsa {
        /// Modulus, big-endian
        modulus: Bytes,
        /// Public exponent, big-endian
        exponent: Bytes,
    },
    /// Elliptic curve key
    Ec {
        /// Uncompressed point
        point: Bytes,
    },
}

impl PublicKey {
    /// Raw key material: the point for EC keys, the modulus for RSA keys
    pub const fn key_bytes(&self) -> &Bytes {
        match self {
            Self::Rsa { modulus, .. } => modulus,
            Self::Ec { point } => point,
        }
    }
}

impl TryFrom<&Node> for PublicKey {
    type Error = Error;

    /// Interpret the children of a `7F49` public key template
    fn try_from(node: &Node) -> Result<Self> {
        let leaf = |tag| node.get(tag).and_then(Node::as_bytes).cloned();

        if let Some(point) = leaf(tags::EC_POINT) {
            return Ok(Self::Ec { point });
        }
        match (leaf(tags::RSA_MODULUS), leaf(tags::RSA_EXPONENT)) {
            (Some(modulus), Some(exponent)) => Ok(Self::Rsa { modulus, exponent }),
            _ => Err(Error::UnexpectedResponse("Generate Asymmetric")),
        }
    }
}

/// Certificate stored in one of the certificate data objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCertificate {
    /// DER certificate, or its gzip stream when `compressed` is set
    pub der: Bytes,
    /// Whether the certificate info byte flags gzip compression
    pub compressed: bool,
}

impl StoredCertificate {
    /// Interpret the value of a certificate data object
    ///
    /// The object is walked flat: `70` holds DER and `71` a single flag byte,
    /// neither of which decodes as nested data objects.
    pub(crate) fn from_object(value: &Bytes) -> Result<Self> {
        let mut der = None;
        let mut compressed = false;

        for object in tlv::walk(value) {
            let (tag, contents) = object?;
            if tag == tags::CERTIFICATE {
                der = Some(value.slice_ref(contents));
            } else if tag == tags::CERT_INFO {
                compressed = contents.first().is_some_and(|info| info & 0x01 != 0);
            }
        }

        let der = der.ok_or(Error::UnexpectedResponse("Get Data"))?;
        Ok(Self { der, compressed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ec_public_key() {
        let tree = tlv::decode(&hex::decode("7F490786050411223344").unwrap()).unwrap();
        let key = PublicKey::try_from(tree.get(tags::PUBLIC_KEY).unwrap()).unwrap();
        assert_eq!(
            key,
            PublicKey::Ec {
                point: Bytes::from_static(&[0x04, 0x11, 0x22, 0x33, 0x44])
            }
        );
    }

    #[test]
    fn test_rsa_public_key() {
        let tree = tlv::decode(&hex::decode("7F490A81030102038203010001").unwrap()).unwrap();
        let key = PublicKey::try_from(tree.get(tags::PUBLIC_KEY).unwrap()).unwrap();
        assert_eq!(key.key_bytes().as_ref(), &[0x01, 0x02, 0x03]);
        let PublicKey::Rsa { exponent, .. } = key else {
            panic!("expected an RSA key");
        };
        assert_eq!(exponent.as_ref(), &[0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_public_key_without_material() {
        let tree = tlv::decode(&hex::decode("7F4903810100").unwrap()).unwrap();
        let err = PublicKey::try_from(tree.get(tags::PUBLIC_KEY).unwrap()).unwrap_err();
        assert!(err.is_data_error());
    }

    fn certificate(object: &str) -> Result<StoredCertificate> {
        StoredCertificate::from_object(&Bytes::from(hex::decode(object).unwrap()))
    }

    #[test]
    fn test_certificate_object() {
        let cert = certificate("7003308100710101FE00").unwrap();
        assert_eq!(cert.der.as_ref(), &[0x30, 0x81, 0x00]);
        assert!(cert.compressed);

        let cert = certificate("700130710100FE00").unwrap();
        assert_eq!(cert.der.as_ref(), &[0x30]);
        assert!(!cert.compressed);

        let err = certificate("710100").unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn test_certificate_object_without_info() {
        let cert = certificate("70023000").unwrap();
        assert_eq!(cert.der.as_ref(), &[0x30, 0x00]);
        assert!(!cert.compressed);
    }

    #[test]
    fn test_truncated_certificate_object() {
        let err = certificate("700530820100").unwrap_err();
        assert!(matches!(err, Error::Tlv(_)));
    }
}
