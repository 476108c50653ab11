//! Card executor implementation
//!
//! The executor sits between an application session and a [`CardTransport`].
//! It turns one logical [`Command`] into as many frames as the card needs:
//! payloads longer than the chunk size are sent as a command chain, and
//! `61 XX` answers are drained with GET RESPONSE until a terminal status word
//! arrives. The terminal status word is handed back untouched.

use std::fmt;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use tracing::{debug, instrument, trace, warn};

use crate::command::{Command, MAX_SHORT_DATA};
use crate::error::{Error, ResultExt};
use crate::response::Response;
use crate::transport::{CardTransport, TransportError};

/// Data bytes carried by each frame of a command chain
pub const DEFAULT_CHUNK_SIZE: usize = 247;

/// Instruction byte of GET RESPONSE
pub const INS_GET_RESPONSE: u8 = 0xC0;

/// Framing options for a [`CardExecutor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Largest data field sent in a single frame before chaining kicks in
    pub chunk_size: usize,
    /// Class byte used for GET RESPONSE
    pub get_response_cla: u8,
    /// Upper bound on GET RESPONSE rounds, `None` to drain until the card stops
    pub max_get_response: Option<usize>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            get_response_cla: 0x00,
            max_get_response: None,
        }
    }
}

impl ExecutorConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size, clamped to what a short APDU can carry
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            1
        } else if chunk_size > MAX_SHORT_DATA {
            MAX_SHORT_DATA
        } else {
            chunk_size
        };
        self
    }

    /// Set the GET RESPONSE class byte
    pub const fn with_get_response_cla(mut self, cla: u8) -> Self {
        self.get_response_cla = cla;
        self
    }

    /// Bound the number of GET RESPONSE rounds
    pub const fn with_max_get_response(mut self, max: Option<usize>) -> Self {
        self.max_get_response = max;
        self
    }
}

/// Card executor: command chaining and response continuation over a transport
pub struct CardExecutor<T: CardTransport> {
    /// The transport used for communication
    transport: T,
    /// Framing options
    config: ExecutorConfig,
}

impl<T: CardTransport> fmt::Debug for CardExecutor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardExecutor")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: CardTransport> CardExecutor<T> {
    /// Create a new card executor with the default framing options
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ExecutorConfig::default())
    }

    /// Create a new card executor with custom framing options
    pub const fn with_config(transport: T, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    /// Framing options in use
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get a reference to the transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Send `command` and collect the complete response
    ///
    /// Only the response to the last frame of a chain is surfaced, with every
    /// GET RESPONSE block appended in order.
    #[instrument(level = "debug", skip_all, fields(ins = command.ins, len = command.data_len()))]
    pub fn transmit(&mut self, command: &Command) -> Result<Response, Error> {
        let started = Instant::now();

        let last = self.send_chain(command)?;
        let response = self.drain(last)?;

        debug!(
            status = %response.status(),
            received = response.payload().len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Exchange complete"
        );
        Ok(response)
    }

    /// Send every frame of the chain and return the response to the last one
    ///
    /// Responses to the intermediate frames are logged and dropped.
    fn send_chain(&mut self, command: &Command) -> Result<Response, Error> {
        let Some(data) = command.data.clone() else {
            return self.exchange(command);
        };

        let chunk_size = self.config.chunk_size;
        let mut offset = 0;

        while data.len() - offset > chunk_size {
            let frame = command.frame(data.slice(offset..offset + chunk_size), true);
            let response = self
                .exchange(&frame)
                .context(format!("Chained frame at offset {offset}"))?;
            if response.is_success() {
                trace!(offset, "Chained frame accepted");
            } else {
                warn!(offset, status = %response.status(), "Chained frame answered with error status");
            }
            offset += chunk_size;
        }

        self.exchange(&command.frame(data.slice(offset..), false))
    }

    /// Follow `61 XX` answers with GET RESPONSE until a terminal status word
    fn drain(&mut self, first: Response) -> Result<Response, Error> {
        let mut status = first.status();
        if status.remaining_bytes().is_none() {
            return Ok(first);
        }

        let mut payload = BytesMut::from(first.payload().as_ref());
        let mut rounds = 0;

        while let Some(remaining) = status.remaining_bytes() {
            if let Some(max) = self.config.max_get_response {
                if rounds >= max {
                    return Err(Error::ChainLimitExceeded(rounds));
                }
            }

            trace!(remaining, accumulated = payload.len(), "Sending GET RESPONSE");
            payload.reserve(if remaining == 0 { 256 } else { usize::from(remaining) });

            let get_response =
                Command::new_with_le(self.config.get_response_cla, INS_GET_RESPONSE, 0x00, 0x00, 0x00);
            let next = self
                .exchange(&get_response)
                .context("Failed to transmit GET RESPONSE command")?;
            payload.extend_from_slice(next.payload());
            status = next.status();
            rounds += 1;
        }

        Ok(Response::new(payload.freeze(), status))
    }

    /// One frame out, one response back
    fn exchange(&mut self, frame: &Command) -> Result<Response, Error> {
        let bytes = frame.to_bytes()?;
        if !self.transport.is_connected() {
            return Err(TransportError::NotConnected.into());
        }
        let raw: Bytes = self.transport.transmit_raw(&bytes)?;
        Response::from_bytes(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn ok() -> Vec<u8> {
        vec![0x90, 0x00]
    }

    #[test]
    fn test_single_frame() {
        let transport = MockTransport::new(vec![vec![0xAB, 0x90, 0x00]]);
        let mut executor = CardExecutor::new(transport);

        let cmd = Command::new_with_data(0x00, 0xCB, 0x3F, 0xFF, vec![0x5Cu8, 0x01, 0x7E]);
        let response = executor.transmit(&cmd).unwrap();

        assert_eq!(response.payload().as_ref(), &[0xAB]);
        assert_eq!(
            executor.transport().commands[0].as_ref(),
            &[0x00, 0xCB, 0x3F, 0xFF, 0x03, 0x5C, 0x01, 0x7E]
        );
    }

    #[test]
    fn test_chaining_splits_payload() {
        let payload: Vec<u8> = (0..(247 * 3 + 10)).map(|i| i as u8).collect();
        let transport = MockTransport::new(vec![ok(), ok(), ok(), vec![0x42, 0x90, 0x00]]);
        let mut executor = CardExecutor::new(transport);

        let cmd = Command::new_with_data(0x00, 0xDB, 0x3F, 0xFF, payload.clone());
        let response = executor.transmit(&cmd).unwrap();
        assert_eq!(response.payload().as_ref(), &[0x42]);

        let frames = &executor.transport().commands;
        assert_eq!(frames.len(), 4);
        for frame in &frames[..3] {
            assert_eq!(frame[0], 0x10);
            assert_eq!(frame[4], 247);
            assert_eq!(frame.len(), 5 + 247);
        }
        assert_eq!(frames[3][0], 0x00);
        assert_eq!(frames[3][4], 10);

        let sent: Vec<u8> = frames.iter().flat_map(|f| f[5..].to_vec()).collect();
        assert_eq!(sent, payload);
    }

    #[test]
    fn test_exact_chunk_is_not_chained() {
        let transport = MockTransport::new(vec![ok()]);
        let mut executor = CardExecutor::new(transport);

        let cmd = Command::new_with_data(0x00, 0xDB, 0x3F, 0xFF, vec![0u8; 247]);
        executor.transmit(&cmd).unwrap();
        assert_eq!(executor.transport().commands.len(), 1);
        assert_eq!(executor.transport().commands[0][0], 0x00);
    }

    #[test]
    fn test_intermediate_chain_status_is_dropped() {
        let transport = MockTransport::new(vec![vec![0x6A, 0x80], vec![0x42, 0x90, 0x00]]);
        let mut executor = CardExecutor::new(transport);

        let cmd = Command::new_with_data(0x00, 0xDB, 0x3F, 0xFF, vec![0u8; 300]);
        let response = executor.transmit(&cmd).unwrap();

        assert!(response.is_success());
        assert_eq!(response.payload().as_ref(), &[0x42]);
        let frames = &executor.transport().commands;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1][0], 0x00);
        assert_eq!(frames[1][4], 53);
    }

    #[test]
    fn test_get_response_accumulates() {
        let mut first = vec![0x01; 64];
        first.extend([0x61, 0x40]);
        let mut second = vec![0x02; 64];
        second.extend([0x61, 0x40]);
        let mut third = vec![0x03; 64];
        third.extend([0x90, 0x00]);

        let transport = MockTransport::new(vec![first, second, third]);
        let mut executor = CardExecutor::new(transport);

        let cmd = Command::new_with_data(0x00, 0xCB, 0x3F, 0xFF, vec![0x5Cu8, 0x01, 0x7E]);
        let response = executor.transmit(&cmd).unwrap();

        assert!(response.is_success());
        assert_eq!(response.payload().len(), 192);
        assert_eq!(&response.payload()[..64], &[0x01; 64][..]);
        assert_eq!(&response.payload()[128..], &[0x03; 64][..]);

        let frames = &executor.transport().commands;
        assert_eq!(frames[1].as_ref(), &[0x00, 0xC0, 0x00, 0x00, 0x00]);
        assert_eq!(frames[2].as_ref(), &[0x00, 0xC0, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_long_continuation_keeps_every_block() {
        let mut responses: Vec<Vec<u8>> = (0..20u8)
            .map(|i| {
                let mut block = vec![i; 100];
                block.extend([0x61, 0x00]);
                block
            })
            .collect();
        responses.push(vec![0xFF, 0x90, 0x00]);
        let mut executor = CardExecutor::new(MockTransport::new(responses));

        let response = executor
            .transmit(&Command::new_with_data(0x00, 0xCB, 0x3F, 0xFF, vec![0x00u8]))
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.payload().len(), 20 * 100 + 1);
        for (i, block) in response.payload().chunks(100).take(20).enumerate() {
            assert!(block.iter().all(|b| usize::from(*b) == i));
        }
        assert_eq!(executor.transport().commands.len(), 21);
    }

    #[test]
    fn test_terminal_error_status_is_returned() {
        let transport = MockTransport::new(vec![vec![0x01, 0x61, 0x01], vec![0x6A, 0x82]]);
        let mut executor = CardExecutor::new(transport);

        let response = executor
            .transmit(&Command::new_with_data(0x00, 0xCB, 0x3F, 0xFF, vec![0x00u8]))
            .unwrap();
        assert_eq!(response.status().to_u16(), 0x6A82);
        assert_eq!(response.payload().as_ref(), &[0x01]);
    }

    #[test]
    fn test_get_response_limit() {
        let transport = MockTransport::new(vec![vec![0x61, 0x10], vec![0x61, 0x10]]);
        let config = ExecutorConfig::new().with_max_get_response(Some(1));
        let mut executor = CardExecutor::with_config(transport, config);

        let err = executor
            .transmit(&Command::new_with_data(0x00, 0xCB, 0x3F, 0xFF, vec![0x00u8]))
            .unwrap_err();
        assert!(matches!(err, Error::ChainLimitExceeded(1)));
    }

    #[test]
    fn test_chunk_size_is_clamped() {
        assert_eq!(ExecutorConfig::new().with_chunk_size(1024).chunk_size, 255);
        assert_eq!(ExecutorConfig::new().with_chunk_size(0).chunk_size, 1);
    }

    #[test]
    fn test_closed_transport_is_refused() {
        let mut transport = MockTransport::new(vec![ok()]);
        transport.disconnect();
        let mut executor = CardExecutor::new(transport);

        let err = executor
            .transmit(&Command::new_with_data(0x00, 0xA4, 0x04, 0x00, vec![0x00u8]))
            .unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::NotConnected)));
    }
}
