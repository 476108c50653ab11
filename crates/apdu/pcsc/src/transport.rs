//! PC/SC transport implementation

use std::ffi::CString;
use std::fmt;

use bytes::Bytes;
use pcsc::{Card, Context, Disposition, MAX_BUFFER_SIZE};
use pivkey_apdu_core::{CardTransport, TransportError};
use tracing::{debug, warn};

use crate::config::PcscConfig;
use crate::error::PcscError;

/// Transport implementation using PC/SC
pub struct PcscTransport {
    /// PC/SC context
    context: Context,
    /// Card connection, if established
    card: Option<Card>,
    /// Reader name
    reader_name: String,
    /// Configuration
    config: PcscConfig,
}

impl fmt::Debug for PcscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscTransport")
            .field("reader_name", &self.reader_name)
            .field("has_card", &self.card.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PcscTransport {
    /// Create a transport bound to `reader_name`; nothing is opened until
    /// [`CardTransport::connect`] is called
    pub(crate) fn new(context: Context, reader_name: &str, config: PcscConfig) -> Self {
        Self {
            context,
            card: None,
            reader_name: reader_name.to_string(),
            config,
        }
    }

    /// Get the reader name
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    /// Get the ATR of the current card
    pub fn atr(&self) -> Result<Vec<u8>, PcscError> {
        self.card.as_ref().map_or_else(
            || Err(PcscError::NoCard(self.reader_name.clone())),
            |card| {
                card.get_attribute_owned(pcsc::Attribute::AtrString)
                    .map_err(Into::into)
            },
        )
    }

    fn connect_card(&mut self) -> Result<(), PcscError> {
        if self.card.is_some() {
            return Ok(());
        }

        let reader = CString::new(self.reader_name.clone())
            .map_err(|_| PcscError::ReaderNotFound(self.reader_name.clone()))?;

        match self
            .context
            .connect(&reader, self.config.share_mode.into(), self.config.protocols)
        {
            Ok(card) => {
                debug!(reader = %self.reader_name, "Connected to card");
                self.card = Some(card);
                Ok(())
            }
            Err(pcsc::Error::NoSmartcard) => Err(PcscError::NoCard(self.reader_name.clone())),
            Err(pcsc::Error::UnknownReader | pcsc::Error::ReaderUnavailable) => {
                Err(PcscError::ReaderNotFound(self.reader_name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn transmit_command(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let card = self
            .card
            .as_mut()
            .ok_or_else(|| PcscError::NoCard(self.reader_name.clone()))?;

        let mut response_buffer = [0u8; MAX_BUFFER_SIZE];
        match card.transmit(command, &mut response_buffer) {
            Ok(response) => Ok(Bytes::copy_from_slice(response)),
            Err(pcsc::Error::RemovedCard) => {
                self.card = None;
                Err(PcscError::CardRemoved)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl CardTransport for PcscTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.connect_card().map_err(|e| match TransportError::from(e) {
            TransportError::Other(message) => TransportError::Connection(message),
            other => other,
        })
    }

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transmit_command(command).map_err(|e| match e {
            PcscError::Pcsc(inner) if inner != pcsc::Error::RemovedCard => {
                TransportError::Transmission(inner.to_string())
            }
            other => other.into(),
        })
    }

    fn disconnect(&mut self) {
        if let Some(card) = self.card.take() {
            match card.disconnect(Disposition::LeaveCard) {
                Ok(()) => debug!(reader = %self.reader_name, "Disconnected from card"),
                Err((_, e)) => warn!(reader = %self.reader_name, error = %e, "Disconnect failed"),
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.card.is_some()
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
