//! Device manager for PC/SC operations

use pcsc::{Context, ReaderState, Scope, State};
use tracing::debug;

use crate::config::PcscConfig;
use crate::error::PcscError;
use crate::reader::PcscReader;
use crate::transport::PcscTransport;

/// Manager for PC/SC device operations
#[allow(missing_debug_implementations)]
pub struct PcscDeviceManager {
    /// PC/SC context
    context: Context,
}

impl PcscDeviceManager {
    /// Create a new PC/SC device manager
    pub fn new() -> Result<Self, PcscError> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context })
    }

    /// List all available card readers
    pub fn list_readers(&self) -> Result<Vec<PcscReader>, PcscError> {
        let readers = match self.context.list_readers_owned() {
            Ok(readers) if !readers.is_empty() => readers,
            Ok(_) | Err(pcsc::Error::NoReadersAvailable) => {
                return Err(PcscError::NoReadersAvailable);
            }
            Err(e) => return Err(e.into()),
        };

        let mut result = Vec::with_capacity(readers.len());
        for reader_name in readers {
            let mut reader_states = vec![ReaderState::new(reader_name.as_c_str(), State::UNAWARE)];

            match self.context.get_status_change(None, &mut reader_states) {
                Ok(()) => result.push(PcscReader::from_reader_state(&reader_states[0])),
                // If we can't get status, assume no card
                Err(_) => result.push(PcscReader::new(
                    reader_name.to_string_lossy().into_owned(),
                    false,
                )),
            }
        }

        Ok(result)
    }

    /// Name of the first reader accepted by `config`
    pub fn find_reader(&self, config: &PcscConfig) -> Result<String, PcscError> {
        let readers = self.list_readers()?;
        readers
            .iter()
            .find(|reader| config.accepts(reader.name()))
            .map(|reader| reader.name().to_string())
            .ok_or_else(|| {
                PcscError::ReaderNotFound(
                    config
                        .reader_prefix
                        .clone()
                        .unwrap_or_else(|| "any reader".to_string()),
                )
            })
    }

    /// Open a transport on a specific reader with the default configuration
    pub fn open_reader(&self, reader_name: &str) -> PcscTransport {
        self.open_reader_with_config(reader_name, PcscConfig::default())
    }

    /// Open a transport on a specific reader with custom configuration
    ///
    /// The transport is not connected yet.
    pub fn open_reader_with_config(&self, reader_name: &str, config: PcscConfig) -> PcscTransport {
        PcscTransport::new(self.context.clone(), reader_name, config)
    }

    /// Discover a reader with [`find_reader`](Self::find_reader) and open a transport on it
    pub fn open_matching(&self, config: PcscConfig) -> Result<PcscTransport, PcscError> {
        let reader_name = self.find_reader(&config)?;
        debug!(reader = %reader_name, "Selected reader");
        Ok(self.open_reader_with_config(&reader_name, config))
    }
}
