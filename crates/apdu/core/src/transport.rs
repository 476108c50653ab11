//! Transport traits for APDU communication with cards
//!
//! A transport owns the physical channel to a single reader/token. It moves
//! raw bytes and knows nothing about chaining, GET RESPONSE or status words.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace};

/// Transport error type
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No reader or token could be found
    #[error("Device not found: {0}")]
    NotFound(String),

    /// The channel to the device could not be opened
    #[error("Failed to connect to device: {0}")]
    Connection(String),

    /// An exchange was attempted on a closed channel
    #[error("Transport is not connected")]
    NotConnected,

    /// Bytes could not be exchanged with the device
    #[error("Failed to transmit data: {0}")]
    Transmission(String),

    /// The token left the reader mid-session
    #[error("Card was removed")]
    CardRemoved,

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

/// Trait for basic card transports
///
/// Implementations are blocking and are not expected to be shared between
/// threads while an exchange is in flight; callers hold them behind `&mut`.
pub trait CardTransport: fmt::Debug + Send {
    /// Open the channel to the token
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Send raw APDU bytes to card and return the response bytes, status word last
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = %hex::encode_upper(command), "Transmitting raw command");
        let result = self.do_transmit_raw(command);
        match &result {
            Ok(response) => {
                trace!(response = %hex::encode_upper(response), "Received raw response");
            }
            Err(e) => {
                debug!(error = %e, "Transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of transmit_raw
    ///
    /// This is the method that concrete implementations should override.
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Close the channel. Calling this on a closed transport does nothing.
    fn disconnect(&mut self);

    /// Check if the transport currently holds an open channel
    fn is_connected(&self) -> bool;
}

impl<T: CardTransport + ?Sized> CardTransport for Box<T> {
    fn connect(&mut self) -> Result<(), TransportError> {
        (**self).connect()
    }

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).do_transmit_raw(command)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

#[cfg(test)]
pub(crate) use mock::MockTransport;

#[cfg(test)]
mod mock {
    use std::collections::VecDeque;

    use super::*;

    /// Mock transport that replays scripted responses and records every frame
    #[derive(Debug, Default)]
    pub(crate) struct MockTransport {
        /// Responses to return, in order
        pub(crate) responses: VecDeque<Bytes>,
        /// Commands that were sent
        pub(crate) commands: Vec<Bytes>,
        /// Whether the transport is connected
        pub(crate) connected: bool,
    }

    impl MockTransport {
        /// Create a connected mock transport with the given responses
        pub(crate) fn new(responses: Vec<Vec<u8>>) -> Self {
            Self {
                responses: responses.into_iter().map(Bytes::from).collect(),
                commands: Vec::new(),
                connected: true,
            }
        }
    }

    impl CardTransport for MockTransport {
        fn connect(&mut self) -> Result<(), TransportError> {
            self.connected = true;
            Ok(())
        }

        fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            self.commands.push(Bytes::copy_from_slice(command));
            self.responses
                .pop_front()
                .ok_or_else(|| TransportError::Transmission("no scripted response".into()))
        }

        fn disconnect(&mut self) {
            self.connected = false;
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }
}
