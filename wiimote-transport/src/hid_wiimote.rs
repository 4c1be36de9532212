//! HID transport for a single Wii Remote
//!
//! Raw I/O only. Each call moves exactly one report; queueing and
//! classification live in the bridge.

use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::{self, Leds, MAX_PAYLOAD};
use crate::types::{DeviceInfo, Payload};
use crate::DeviceHandle;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 10;

/// Wii Remote opened through hidapi
pub struct HidWiimote {
    /// Device node; reads and writes are serialized through this lock
    device: Mutex<HidDevice>,
    /// Device information
    info: DeviceInfo,
    /// Read timeout in milliseconds (bounds how long a poll sweep blocks)
    read_timeout_ms: i32,
}

impl HidWiimote {
    /// Wrap an opened HID device
    pub fn new(device: HidDevice, info: DeviceInfo) -> Self {
        Self {
            device: Mutex::new(device),
            info,
            read_timeout_ms: timeout_arg(DEFAULT_READ_TIMEOUT_MS),
        }
    }

    /// Set read timeout (default 10ms, never less than 1ms)
    pub fn with_read_timeout(mut self, ms: u32) -> Self {
        self.read_timeout_ms = timeout_arg(ms);
        self
    }
}

/// hidapi timeout argument for `ms`
///
/// Always positive: 0 would make the read non-blocking and a negative
/// value blocks until input arrives.
fn timeout_arg(ms: u32) -> i32 {
    i32::try_from(ms.max(1)).unwrap_or(i32::MAX)
}

impl DeviceHandle for HidWiimote {
    fn read(&self) -> Result<Option<Payload>, TransportError> {
        let device = self.device.lock();
        let mut buf = [0u8; MAX_PAYLOAD];
        match device.read_timeout(&mut buf, self.read_timeout_ms)? {
            0 => Ok(None),
            len => Ok(Some(Payload::from_slice(&buf[..len]))),
        }
    }

    fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        let device = self.device.lock();
        let written = device.write(data)?;
        if written < data.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(())
    }

    fn set_indicator(&self, leds: Leds) -> Result<(), TransportError> {
        debug!("Setting LEDs {} on {}", leds, self.info.device_path);
        self.write(&protocol::build_led_report(leds))
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl Drop for HidWiimote {
    fn drop(&mut self) {
        debug!("HidWiimote {} closed", self.info.device_path);
    }
}
