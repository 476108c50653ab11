//! Configuration options for PC/SC transport

use pcsc::{Protocols as PcscProtocols, ShareMode as PcscShareMode};

/// Reader name prefix used when no reader is named explicitly
pub const DEFAULT_READER_PREFIX: &str = "Yubico";

/// Sharing mode for card connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    /// Exclusive access to the card
    Exclusive,
    /// Shared access to the card (default)
    Shared,
    /// Direct connection to the reader
    Direct,
}

impl From<ShareMode> for PcscShareMode {
    fn from(mode: ShareMode) -> Self {
        match mode {
            ShareMode::Exclusive => Self::Exclusive,
            ShareMode::Shared => Self::Shared,
            ShareMode::Direct => Self::Direct,
        }
    }
}

/// Configuration options for PC/SC transport
#[derive(Debug, Clone)]
pub struct PcscConfig {
    /// Sharing mode for card connections
    pub share_mode: ShareMode,

    /// Preferred protocols for card communication
    pub protocols: PcscProtocols,

    /// Only readers whose name starts with this prefix are considered when
    /// discovering a token; `None` accepts the first reader found
    pub reader_prefix: Option<String>,
}

impl Default for PcscConfig {
    fn default() -> Self {
        Self {
            share_mode: ShareMode::Shared,
            protocols: PcscProtocols::T1,
            reader_prefix: Some(DEFAULT_READER_PREFIX.to_string()),
        }
    }
}

impl PcscConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sharing mode
    pub const fn with_share_mode(mut self, mode: ShareMode) -> Self {
        self.share_mode = mode;
        self
    }

    /// Set the preferred protocols
    pub const fn with_protocols(mut self, protocols: PcscProtocols) -> Self {
        self.protocols = protocols;
        self
    }

    /// Set the reader name prefix used during discovery
    pub fn with_reader_prefix(mut self, prefix: Option<impl Into<String>>) -> Self {
        self.reader_prefix = prefix.map(Into::into);
        self
    }

    /// Whether a reader with this name is eligible for discovery
    pub fn accepts(&self, reader_name: &str) -> bool {
        self.reader_prefix
            .as_deref()
            .is_none_or(|prefix| reader_name.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix_filters_readers() {
        let config = PcscConfig::default();
        assert!(config.accepts("Yubico YubiKey OTP+FIDO+CCID 00 00"));
        assert!(!config.accepts("Generic Smart Card Reader 00 00"));
    }

    #[test]
    fn test_without_prefix_accepts_everything() {
        let config = PcscConfig::new().with_reader_prefix(None::<String>);
        assert!(config.accepts("Generic Smart Card Reader 00 00"));
    }

    #[test]
    fn test_builder() {
        let config = PcscConfig::new()
            .with_share_mode(ShareMode::Exclusive)
            .with_protocols(PcscProtocols::ANY)
            .with_reader_prefix(Some("Nitrokey"));
        assert_eq!(config.share_mode, ShareMode::Exclusive);
        assert_eq!(config.protocols, PcscProtocols::ANY);
        assert!(config.accepts("Nitrokey 3"));
    }
}
