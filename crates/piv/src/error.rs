//! Error types for PIV sessions
//!
//! [`Error`] covers the whole path from reader discovery to interpreting a
//! reply, with status words translated into the PIN and card variants.

use pivkey_apdu_core::{StatusWord, TransportError};

use crate::tlv::TlvError;

/// Result type for PIV operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for PIV operations
///
/// Status words are translated here: the framer below hands back whatever the
/// token answered and [`PivCard`](crate::PivCard) decides what it means.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No reader or token could be found
    #[error("PIV not found: {0}")]
    NotFound(String),

    /// The channel to the token could not be opened or the application
    /// could not be selected
    #[error("Error in connecting to PIV: {0}")]
    Connection(String),

    /// Wrong PIN, with the retries the token reports as left
    #[error("Wrong PIN. {retries_left} {} left", tries(.retries_left))]
    Pin {
        /// Retries left before the PIN is blocked
        retries_left: u8,
    },

    /// Status word this layer has no specific meaning for
    #[error("Error status : 0x{0}")]
    Card(StatusWord),

    /// Reply that is well formed but not what the command should return
    #[error("Bad data received from {0} command")]
    UnexpectedResponse(&'static str),

    /// Reply that is not valid BER-TLV
    #[error("Bad data received: {0}")]
    Tlv(#[from] TlvError),

    /// Failure while exchanging frames with the token
    #[error(transparent)]
    Transport(pivkey_apdu_core::Error),

    /// Argument rejected before anything was sent to the token
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

const fn tries(retries_left: &u8) -> &'static str {
    if *retries_left >= 2 { "tries" } else { "try" }
}

impl Error {
    /// Whether the token sent data this layer could not interpret
    pub const fn is_data_error(&self) -> bool {
        matches!(self, Self::Tlv(_) | Self::UnexpectedResponse(_))
    }

    /// Whether the token reported the authentication method as blocked (69 83)
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Card(status) if status.is_authentication_blocked())
    }

    /// Retries left if this is a wrong PIN error
    pub const fn retries_left(&self) -> Option<u8> {
        match self {
            Self::Pin { retries_left } => Some(*retries_left),
            _ => None,
        }
    }

    /// Status word if the token answered with one this layer does not handle
    pub const fn status(&self) -> Option<StatusWord> {
        match self {
            Self::Card(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::NotFound(message) => Self::NotFound(message),
            TransportError::Connection(message) => Self::Connection(message),
            other => Self::Transport(other.into()),
        }
    }
}

impl From<pivkey_apdu_core::Error> for Error {
    fn from(error: pivkey_apdu_core::Error) -> Self {
        match error.root() {
            pivkey_apdu_core::Error::Transport(TransportError::NotFound(message)) => {
                Self::NotFound(message.clone())
            }
            _ => Self::Transport(error),
        }
    }
}

#[cfg(feature = "pcsc")]
impl From<pivkey_apdu_transport_pcsc::PcscError> for Error {
    fn from(error: pivkey_apdu_transport_pcsc::PcscError) -> Self {
        TransportError::from(error).into()
    }
}
