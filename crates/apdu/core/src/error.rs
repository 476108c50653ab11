//! Core error type for APDU exchanges
//!
//! Transport failures, malformed frames and framer limits all surface as
//! [`Error`]. Status words are *not* errors at this layer: the executor returns
//! the terminal status word to the caller, which owns the mapping to its own
//! taxonomy.

use crate::transport::TransportError;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport failed to connect or exchange bytes
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response shorter than a status word
    #[error("Invalid response length: {0}")]
    InvalidResponseLength(usize),

    /// Command frame that cannot be parsed
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// Too many GET RESPONSE rounds for the configured limit
    #[error("Chain limit exceeded after {0} GET RESPONSE rounds")]
    ChainLimitExceeded(usize),

    /// Context error with message and source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every context layer stripped
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Extension trait for Result with APDU Errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T, Error>;
}

impl<T> ResultExt<T> for Result<T, Error> {
    fn context<S: Into<String>>(self, context: S) -> Self {
        self.map_err(|e| e.with_context(context))
    }
}
