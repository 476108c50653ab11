//! Common test utilities

#![allow(dead_code, unreachable_pub)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pivkey::{Bytes, CardTransport, PivConfig, TransportError};

/// Transport answering from a script and recording every frame it is sent
///
/// Clones share state, so a test can hand one clone to a session and inspect
/// the other after the session is gone.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    responses: VecDeque<Vec<u8>>,
    frames: Vec<Vec<u8>>,
    connected: bool,
    disconnects: usize,
    connect_error: Option<TransportError>,
}

impl ScriptedTransport {
    /// Transport answering with the given hex responses, in order
    pub fn new(responses: &[&str]) -> Self {
        let transport = Self::default();
        transport.push(responses);
        transport
    }

    /// Transport whose `connect` fails with `error`
    pub fn failing(error: TransportError) -> Self {
        let transport = Self::default();
        transport.state.lock().unwrap().connect_error = Some(error);
        transport
    }

    /// Queue more hex responses
    pub fn push(&self, responses: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state
            .responses
            .extend(responses.iter().map(|r| hex::decode(r).unwrap()));
    }

    /// Queue one raw response
    pub fn push_bytes(&self, response: Vec<u8>) {
        self.state.lock().unwrap().responses.push_back(response);
    }

    /// Every frame sent so far
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().frames.clone()
    }

    /// Frames sent after the initial SELECT
    pub fn frames_after_select(&self) -> Vec<Vec<u8>> {
        self.frames().into_iter().skip(1).collect()
    }

    /// Number of `disconnect` calls that closed an open channel
    pub fn disconnects(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    /// Responses not consumed yet
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().responses.len()
    }
}

impl CardTransport for ScriptedTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.connect_error.take() {
            return Err(error);
        }
        state.connected = true;
        Ok(())
    }

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.frames.push(command.to_vec());
        state
            .responses
            .pop_front()
            .map(Bytes::from)
            .ok_or_else(|| TransportError::Transmission("script exhausted".to_string()))
    }

    fn disconnect(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.connected {
            state.connected = false;
            state.disconnects += 1;
        }
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}

/// Session options without the post-SELECT pause
pub fn test_config() -> PivConfig {
    PivConfig::default().with_select_delay(Duration::ZERO)
}

/// SELECT frame for the PIV applet
pub const SELECT_FRAME: &str = "00A404000BA000000308000010000100";
