//! PIV session
//!
//! A [`PivCard`] owns the transport for as long as the session lives. Opening
//! one connects and selects the applet; dropping or closing it disconnects,
//! whatever path led there. PIN state is never cached: every operation relies
//! on what the token itself remembers.

use std::thread;

use bytes::{Bytes, BytesMut};
use pivkey_apdu_core::{CardExecutor, CardTransport, Command, Response};
use tracing::{Level, debug, info, warn};

use crate::config::PivConfig;
use crate::constants::{
    CLA_ISO, GENERATE_PARAMETER, P1_SELECT_BY_AID, P1P2_GET_DATA, ins, objects, tags,
};
use crate::pin::PinBlock;
use crate::tlv::{self, Node, Tag};
use crate::types::StoredCertificate;
use crate::{Error, Result};

/// Session with the PIV applet of a single token
#[derive(Debug)]
pub struct PivCard<T: CardTransport> {
    /// Framer driving the transport
    executor: CardExecutor<T>,
    /// Session options
    config: PivConfig,
}

impl<T: CardTransport> PivCard<T> {
    /// Connect `transport` and select the PIV applet
    ///
    /// Any failure while selecting is reported as [`Error::Connection`] and
    /// leaves the transport disconnected.
    pub fn open(mut transport: T, config: PivConfig) -> Result<Self> {
        transport.connect()?;

        let mut card = Self {
            executor: CardExecutor::with_config(transport, config.executor_config()),
            config,
        };

        match card.select() {
            Ok(()) => Ok(card),
            Err(e @ (Error::Connection(_) | Error::NotFound(_))) => Err(e),
            Err(e) => Err(Error::Connection(e.to_string())),
        }
    }

    /// Open a session, run `f` on it and close it whatever `f` returns
    pub fn with_session<R>(
        transport: T,
        config: PivConfig,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let mut card = Self::open(transport, config)?;
        let result = f(&mut card);
        card.close();
        result
    }

    /// Session options
    pub const fn config(&self) -> &PivConfig {
        &self.config
    }

    /// Transport the session runs on
    pub const fn transport(&self) -> &T {
        self.executor.transport()
    }

    /// Select the PIV applet
    ///
    /// Anything but `90 00` is a [`Error::Connection`]: no other command
    /// makes sense until the applet is selected.
    pub fn select(&mut self) -> Result<()> {
        let command = Command::new_with_data(
            CLA_ISO,
            ins::SELECT,
            P1_SELECT_BY_AID,
            0x00,
            self.config.aid.clone(),
        );
        let response = self.executor.transmit(&command)?;
        if !response.is_success() {
            warn!(status = %response.status(), "PIV applet selection failed");
            return Err(Error::Connection(format!(
                "selecting the PIV applet returned status {}",
                response.status()
            )));
        }

        debug!(aid = %hex::encode_upper(&self.config.aid), "PIV applet selected");
        if !self.config.select_delay.is_zero() {
            thread::sleep(self.config.select_delay);
        }
        Ok(())
    }

    /// Verify `pin` against the PIN reference `bank`
    ///
    /// An empty `pin` sends an empty VERIFY, which reports the PIN status
    /// without spending a retry.
    pub fn verify_pin(&mut self, bank: u8, pin: &str) -> Result<()> {
        let data = if pin.is_empty() {
            Bytes::new()
        } else {
            let block = PinBlock::new(pin)?;
            Bytes::copy_from_slice(block.as_ref())
        };

        let command = Command::new_with_data(CLA_ISO, ins::VERIFY, 0x00, bank, data);
        self.send(&command).map(drop)
    }

    /// Whether the PIN reference `bank` is blocked
    ///
    /// Probes with an empty VERIFY: `69 83` means blocked, a retry count or
    /// success means it is not.
    pub fn is_locked(&mut self, bank: u8) -> Result<bool> {
        match self.verify_pin(bank, "") {
            Ok(()) | Err(Error::Pin { .. }) => Ok(false),
            Err(e) if e.is_blocked() => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Read a data object
    ///
    /// A three byte `path` is a PIV object identifier: the reply is a `53`
    /// object and its value is returned. A one or two byte `path` is a BER tag
    /// and the reply must be an object with that tag, whose value is returned.
    pub fn get_data(&mut self, path: &[u8]) -> Result<Node> {
        let reply_tag = match path.len() {
            3 => tags::DATA,
            1 | 2 => Tag::try_from(path).map_err(|_| {
                Error::InvalidArgument(format!("{} is not a valid tag", hex::encode_upper(path)))
            })?,
            n => {
                return Err(Error::InvalidArgument(format!(
                    "data object paths are 1 to 3 bytes long, got {n}"
                )));
            }
        };
        debug!(path = %hex::encode_upper(path), "Reading data object");

        let mut data = BytesMut::with_capacity(path.len() + 2);
        tlv::write_object(&mut data, tags::TAG_LIST, path);

        let (p1, p2) = P1P2_GET_DATA;
        let command = Command::new_with_data(CLA_ISO, ins::GET_DATA, p1, p2, data.freeze());
        let reply = self.send(&command)?;

        if !reply.starts_with(&reply_tag.to_vec()) {
            return Err(Error::UnexpectedResponse("Get Data"));
        }
        tlv::decode(&reply)?
            .as_branch()
            .and_then(|children| children.get(&reply_tag))
            .cloned()
            .ok_or(Error::UnexpectedResponse("Get Data"))
    }

    /// [`get_data`](Self::get_data) with the path given in hex, e.g. `"5FC10A"`
    pub fn get_data_hex(&mut self, path: &str) -> Result<Node> {
        let path = hex::decode(path)
            .map_err(|e| Error::InvalidArgument(format!("data object path {path:?}: {e}")))?;
        self.get_data(&path)
    }

    /// Generate a key pair in `slot` with mechanism `algorithm`
    ///
    /// Returns the children of the `7F49` public key template, see
    /// [`PublicKey`](crate::PublicKey) for a typed view.
    pub fn generate_asymmetric_key(&mut self, slot: u8, algorithm: u8) -> Result<Node> {
        let mut template = BytesMut::new();
        tlv::write_object(&mut template, tags::MECHANISM, &[algorithm]);
        tlv::write_object(&mut template, tags::PARAMETER, &[GENERATE_PARAMETER]);

        let mut data = BytesMut::new();
        tlv::write_object(&mut data, tags::CONTROL_REFERENCE, &template);

        let command =
            Command::new_with_data(CLA_ISO, ins::GENERATE_ASYMMETRIC, 0x00, slot, data.freeze());
        let reply = self.send(&command)?;

        let mut parsed = tlv::parse(&reply)?;
        match parsed.pop() {
            Some(object) if parsed.is_empty() && object.tag == tags::PUBLIC_KEY => {
                debug!(slot, algorithm, "Key pair generated");
                Ok(object.value)
            }
            _ => Err(Error::UnexpectedResponse("Generate Asymmetric")),
        }
    }

    /// Sign `digest` with the key in `slot` using mechanism `algorithm`
    ///
    /// The digest is sent as is; hashing and padding are the caller's job.
    pub fn sign(&mut self, slot: u8, algorithm: u8, digest: &[u8]) -> Result<Bytes> {
        let mut template = BytesMut::new();
        tlv::write_object(&mut template, tags::RESPONSE, &[]);
        tlv::write_object(&mut template, tags::CHALLENGE, digest);

        let mut data = BytesMut::new();
        tlv::write_object(&mut data, tags::DYNAMIC_AUTH, &template);

        let command = Command::new_with_data(
            CLA_ISO,
            ins::GENERAL_AUTHENTICATE,
            algorithm,
            slot,
            data.freeze(),
        );
        let reply = self.send(&command)?;

        tlv::decode(&reply)?
            .get_path(&[tags::DYNAMIC_AUTH, tags::RESPONSE])
            .and_then(Node::as_bytes)
            .cloned()
            .ok_or(Error::UnexpectedResponse("General Authenticate"))
    }

    /// Read the certificate stored for the key in `slot`
    pub fn read_certificate(&mut self, slot: u8) -> Result<StoredCertificate> {
        let object = objects::certificate_for_slot(slot).ok_or_else(|| {
            Error::InvalidArgument(format!("slot {slot:02X} has no certificate object"))
        })?;

        let value = self
            .get_data(object)?
            .into_bytes()
            .ok_or(Error::UnexpectedResponse("Get Data"))?;
        StoredCertificate::from_object(&value)
    }

    /// Disconnect and end the session
    pub fn close(mut self) {
        self.disconnect();
    }

    /// Send `command` and map the terminal status word
    fn send(&mut self, command: &Command) -> Result<Bytes> {
        let response = self.executor.transmit(command)?;
        check(response)
    }

    fn disconnect(&mut self) {
        let transport = self.executor.transport_mut();
        if transport.is_connected() {
            debug!("Closing PIV session");
        }
        transport.disconnect();
    }
}

#[cfg(feature = "pcsc")]
impl PivCard<pivkey_apdu_transport_pcsc::PcscTransport> {
    /// Open a session on the first PC/SC reader accepted by `pcsc_config`
    pub fn open_pcsc(
        pcsc_config: &pivkey_apdu_transport_pcsc::PcscConfig,
        config: PivConfig,
    ) -> Result<Self> {
        let manager = pivkey_apdu_transport_pcsc::PcscDeviceManager::new()?;
        let transport = manager.open_matching(pcsc_config.clone())?;
        debug!(reader = transport.reader_name(), "Opening PIV session");
        Self::open(transport, config)
    }
}

impl<T: CardTransport> Drop for PivCard<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Translate the terminal status word of an exchange
fn check(response: Response) -> Result<Bytes> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.into_payload());
    }

    let description = status.description();
    match status.tracing_level() {
        Level::WARN => warn!(%status, description, "Command failed"),
        Level::INFO => info!(%status, description, "Command failed"),
        _ => debug!(%status, description, "Command failed"),
    }

    match status.verification_retries() {
        Some(retries_left) => Err(Error::Pin { retries_left }),
        None => Err(Error::Card(status)),
    }
}
