//! Common test utilities

use pivkey_apdu_transport_pcsc::{PcscConfig, PcscDeviceManager, PcscTransport};

/// Try to get a transport on a reader accepted by the default configuration
pub fn get_test_transport() -> Option<PcscTransport> {
    let manager = PcscDeviceManager::new().ok()?;
    manager.open_matching(PcscConfig::default()).ok()
}
