//! Error types for PC/SC transport

use pivkey_apdu_core::TransportError;

/// PC/SC-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// PC/SC error
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// No readers available
    #[error("No readers available")]
    NoReadersAvailable,

    /// Reader not found
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// Card was removed
    #[error("Card was removed")]
    CardRemoved,
}

impl From<PcscError> for TransportError {
    fn from(error: PcscError) -> Self {
        match error {
            PcscError::NoReadersAvailable
            | PcscError::ReaderNotFound(_)
            | PcscError::Pcsc(pcsc::Error::NoService | pcsc::Error::ServiceStopped) => {
                Self::NotFound(error.to_string())
            }
            PcscError::NoCard(_) => Self::Connection(error.to_string()),
            PcscError::CardRemoved | PcscError::Pcsc(pcsc::Error::RemovedCard) => {
                Self::CardRemoved
            }
            PcscError::Pcsc(e) => Self::Other(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_errors_are_not_found() {
        assert!(matches!(
            TransportError::from(PcscError::NoReadersAvailable),
            TransportError::NotFound(_)
        ));
        assert!(matches!(
            TransportError::from(PcscError::ReaderNotFound("Yubico".into())),
            TransportError::NotFound(_)
        ));
        assert!(matches!(
            TransportError::from(PcscError::Pcsc(pcsc::Error::NoService)),
            TransportError::NotFound(_)
        ));
    }

    #[test]
    fn test_card_errors() {
        assert!(matches!(
            TransportError::from(PcscError::NoCard("reader".into())),
            TransportError::Connection(_)
        ));
        assert!(matches!(
            TransportError::from(PcscError::Pcsc(pcsc::Error::RemovedCard)),
            TransportError::CardRemoved
        ));
    }
}
