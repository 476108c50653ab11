//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types for talking to a smart card
//! according to ISO/IEC 7816-4:
//!
//! - [`Command`] and [`Response`] frames and the [`StatusWord`] that ends
//!   every exchange
//! - the [`CardTransport`] trait implemented by concrete readers
//! - the [`CardExecutor`], which chains oversized commands and drains
//!   `61 XX` continuations with GET RESPONSE
//!
//! Status words are reported, not judged: mapping them to errors is left to
//! the application layer that knows what they mean.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod command;
pub mod error;
pub mod executor;
pub mod response;
pub mod transport;

pub use command::{CLA_CHAINING, Command, ExpectedLength};
pub use error::{Error, ResultExt};
pub use executor::{CardExecutor, DEFAULT_CHUNK_SIZE, ExecutorConfig};
pub use response::Response;
pub use response::status::StatusWord;
pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::response::status::{StatusWord, common as status};
    pub use crate::{
        Bytes, BytesMut, CardExecutor, CardTransport, Command, Error, ExecutorConfig, Response,
        ResultExt, TransportError,
    };
}
