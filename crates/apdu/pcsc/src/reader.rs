//! Reader representation for PC/SC devices

use pcsc::{ReaderState, State};

/// Representation of a PC/SC card reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcscReader {
    /// Name of the reader
    name: String,

    /// Whether a card is present
    has_card: bool,
}

impl PcscReader {
    /// Create a new reader
    pub const fn new(name: String, has_card: bool) -> Self {
        Self { name, has_card }
    }

    /// Get the reader name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a card is present in the reader
    pub const fn has_card(&self) -> bool {
        self.has_card
    }

    /// Create a reader from a reader state
    pub(crate) fn from_reader_state(reader_state: &ReaderState) -> Self {
        let state = reader_state.event_state();
        Self {
            name: reader_state.name().to_string_lossy().into_owned(),
            has_card: state.contains(State::PRESENT) && !state.contains(State::EMPTY),
        }
    }
}
