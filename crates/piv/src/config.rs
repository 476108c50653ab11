//! Session configuration

use std::time::Duration;

use bytes::Bytes;
use pivkey_apdu_core::{DEFAULT_CHUNK_SIZE, ExecutorConfig};

use crate::constants::{PIV_AID, SELECT_DELAY_MS};

/// Time given to the applet to settle after SELECT
pub const DEFAULT_SELECT_DELAY: Duration = Duration::from_millis(SELECT_DELAY_MS);

/// Configuration options for a [`PivCard`](crate::PivCard) session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivConfig {
    /// Application identifier sent with SELECT
    pub aid: Bytes,

    /// Data bytes per frame when a command has to be chained
    pub chunk_size: usize,

    /// Pause after a successful SELECT
    pub select_delay: Duration,

    /// Upper bound on GET RESPONSE rounds per command, `None` for no bound
    pub max_get_response: Option<usize>,
}

impl Default for PivConfig {
    fn default() -> Self {
        Self {
            aid: Bytes::from_static(PIV_AID),
            chunk_size: DEFAULT_CHUNK_SIZE,
            select_delay: DEFAULT_SELECT_DELAY,
            max_get_response: None,
        }
    }
}

impl PivConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a different application identifier
    pub fn with_aid(mut self, aid: impl Into<Bytes>) -> Self {
        self.aid = aid.into();
        self
    }

    /// Set the chunk size used for command chaining
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the pause after SELECT
    pub const fn with_select_delay(mut self, delay: Duration) -> Self {
        self.select_delay = delay;
        self
    }

    /// Bound the number of GET RESPONSE rounds per command
    pub const fn with_max_get_response(mut self, max: Option<usize>) -> Self {
        self.max_get_response = max;
        self
    }

    /// Framing options for the executor driving this session
    pub const fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            get_response_cla: 0x00,
            max_get_response: self.max_get_response,
        }
        .with_chunk_size(self.chunk_size)
    }
}
