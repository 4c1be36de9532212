//! Scripted in-memory Wii Remote
//!
//! `MockWiimote` replays queued reads and records writes. Clones share
//! state, so a test can keep one clone for inspection while the other is
//! boxed and handed to the code under test.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::device_registry::{PID_WIIMOTE, VENDOR_ID};
use crate::error::TransportError;
use crate::protocol::Leds;
use crate::types::{DeviceInfo, Payload};
use crate::{BoxedDevice, DeviceDiscovery, DeviceHandle};

/// What the next `read` call returns
#[derive(Debug, Clone)]
enum ScriptedRead {
    Report(Payload),
    Timeout,
    Error,
}

#[derive(Default)]
struct MockState {
    reads: Mutex<VecDeque<ScriptedRead>>,
    writes: Mutex<Vec<Vec<u8>>>,
    indicator: Mutex<Option<Leds>>,
    fail_writes: Mutex<bool>,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

/// Scripted device handle
#[derive(Clone)]
pub struct MockWiimote {
    state: Arc<MockState>,
    info: DeviceInfo,
    /// Pause on an empty script, standing in for the HID read timeout
    idle_read_delay: Duration,
}

impl Default for MockWiimote {
    fn default() -> Self {
        Self::new("mock0")
    }
}

impl MockWiimote {
    pub fn new(path: &str) -> Self {
        Self {
            state: Arc::new(MockState::default()),
            info: DeviceInfo {
                vid: VENDOR_ID,
                pid: PID_WIIMOTE,
                device_path: path.to_string(),
                serial: None,
                product_name: Some("Mock Wii Remote".to_string()),
            },
            idle_read_delay: Duration::from_millis(1),
        }
    }

    /// Queue an input report for a later `read`
    pub fn push_report(&self, data: &[u8]) {
        self.state
            .reads
            .lock()
            .push_back(ScriptedRead::Report(Payload::from_slice(data)));
    }

    /// Queue an explicit read timeout
    pub fn push_timeout(&self) {
        self.state.reads.lock().push_back(ScriptedRead::Timeout);
    }

    /// Queue a read failure
    pub fn push_error(&self) {
        self.state.reads.lock().push_back(ScriptedRead::Error);
    }

    /// Make every following write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        *self.state.fail_writes.lock() = fail;
    }

    /// Reports still waiting to be read
    pub fn pending_reads(&self) -> usize {
        self.state.reads.lock().len()
    }

    /// Successfully written reports, in order
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.writes.lock().clone()
    }

    /// Last indicator pattern set, if any
    pub fn indicator(&self) -> Option<Leds> {
        *self.state.indicator.lock()
    }

    pub fn read_calls(&self) -> usize {
        self.state.read_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.state.write_calls.load(Ordering::SeqCst)
    }

    /// Total read and write calls so far
    pub fn io_calls(&self) -> usize {
        self.read_calls() + self.write_calls()
    }

    /// Box a clone for handing to code under test
    pub fn boxed(&self) -> BoxedDevice {
        Box::new(self.clone())
    }
}

impl DeviceHandle for MockWiimote {
    fn read(&self) -> Result<Option<Payload>, TransportError> {
        self.state.read_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.state.reads.lock().pop_front();
        match next {
            Some(ScriptedRead::Report(payload)) => Ok(Some(payload)),
            Some(ScriptedRead::Timeout) => Ok(None),
            Some(ScriptedRead::Error) => Err(TransportError::Disconnected),
            None => {
                std::thread::sleep(self.idle_read_delay);
                Ok(None)
            }
        }
    }

    fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        self.state.write_calls.fetch_add(1, Ordering::SeqCst);
        if *self.state.fail_writes.lock() {
            return Err(TransportError::HidError("scripted write failure".into()));
        }
        self.state.writes.lock().push(data.to_vec());
        Ok(())
    }

    fn set_indicator(&self, leds: Leds) -> Result<(), TransportError> {
        *self.state.indicator.lock() = Some(leds);
        Ok(())
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.info
    }
}

/// Discovery over a fixed set of mock devices
#[derive(Clone, Default)]
pub struct MockDiscovery {
    devices: Vec<MockWiimote>,
    /// Enumeration fails with this message when set
    failure: Option<String>,
}

impl MockDiscovery {
    pub fn new(devices: Vec<MockWiimote>) -> Self {
        Self {
            devices,
            failure: None,
        }
    }

    /// Discovery that never finds anything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Discovery whose enumeration always fails
    pub fn failing(message: &str) -> Self {
        Self {
            devices: Vec::new(),
            failure: Some(message.to_string()),
        }
    }

    fn check(&self) -> Result<(), TransportError> {
        match &self.failure {
            Some(message) => Err(TransportError::Internal(message.clone())),
            None => Ok(()),
        }
    }
}

impl DeviceDiscovery for MockDiscovery {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, TransportError> {
        self.check()?;
        Ok(self.devices.iter().map(|d| d.info.clone()).collect())
    }

    fn discover(&self, max_count: usize) -> Result<Vec<BoxedDevice>, TransportError> {
        self.check()?;
        Ok(self
            .devices
            .iter()
            .take(max_count)
            .map(MockWiimote::boxed)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads_in_order() {
        let mock = MockWiimote::default();
        mock.push_report(&[0x20, 0x00]);
        mock.push_timeout();
        mock.push_error();

        let first = mock.read().unwrap().unwrap();
        assert_eq!(first.report_id(), 0x20);
        assert!(mock.read().unwrap().is_none());
        assert!(matches!(mock.read(), Err(TransportError::Disconnected)));
        // Script exhausted
        assert!(mock.read().unwrap().is_none());
        assert_eq!(mock.read_calls(), 4);
    }

    #[test]
    fn test_clones_share_state() {
        let shared = MockWiimote::default();
        let handle = shared.boxed();
        handle.write(&[0x11, 0x80]).unwrap();
        handle.set_indicator(Leds::LED_2).unwrap();

        assert_eq!(shared.writes(), vec![vec![0x11, 0x80]]);
        assert_eq!(shared.indicator(), Some(Leds::LED_2));
    }

    #[test]
    fn test_failed_writes_are_not_recorded() {
        let mock = MockWiimote::default();
        mock.set_fail_writes(true);
        assert!(mock.write(&[0x15, 0x00]).is_err());
        assert!(mock.writes().is_empty());
        assert_eq!(mock.write_calls(), 1);
    }

    #[test]
    fn test_discovery_respects_max_count() {
        let discovery = MockDiscovery::new(vec![
            MockWiimote::new("a"),
            MockWiimote::new("b"),
            MockWiimote::new("c"),
        ]);
        assert_eq!(discovery.discover(2).unwrap().len(), 2);
        assert_eq!(discovery.list_devices().unwrap().len(), 3);
        assert!(MockDiscovery::empty().discover(4).unwrap().is_empty());
    }

    #[test]
    fn test_failing_discovery() {
        let discovery = MockDiscovery::failing("hidapi unavailable");
        assert!(matches!(
            discovery.discover(1),
            Err(TransportError::Internal(m)) if m == "hidapi unavailable"
        ));
        assert!(discovery.list_devices().is_err());
    }
}
