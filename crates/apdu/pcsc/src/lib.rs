//! PC/SC transport implementation for APDU operations
//!
//! This crate provides an implementation of the `CardTransport` trait from
//! `pivkey-apdu-core` using the PC/SC API, plus the reader discovery the
//! protocol layer deliberately leaves out.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use pivkey_apdu_core::{CardExecutor, CardTransport, Command};
//! use pivkey_apdu_transport_pcsc::{PcscConfig, PcscDeviceManager};
//!
//! let manager = PcscDeviceManager::new()?;
//! let mut transport = manager.open_matching(PcscConfig::default())?;
//! transport.connect()?;
//!
//! let mut executor = CardExecutor::new(transport);
//! let aid = vec![0xA0u8, 0x00, 0x00, 0x03, 0x08];
//! let response = executor.transmit(&Command::new_with_data(0x00, 0xA4, 0x04, 0x00, aid))?;
//! println!("SELECT: {}", response.status());
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod reader;
mod transport;

pub use config::{DEFAULT_READER_PREFIX, PcscConfig, ShareMode};
pub use error::PcscError;
pub use manager::PcscDeviceManager;
pub use reader::PcscReader;
pub use transport::PcscTransport;

// Re-export some pcsc types for convenience
pub use pcsc::{Protocol, Protocols};
