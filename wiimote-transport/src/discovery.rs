//! Device discovery for Wii Remotes

use std::collections::HashSet;
use std::time::{Duration, Instant};

use hidapi::HidApi;
use tracing::{debug, info, warn};

use crate::device_registry;
use crate::error::TransportError;
use crate::hid_wiimote::{HidWiimote, DEFAULT_READ_TIMEOUT_MS};
use crate::types::DeviceInfo;
use crate::{BoxedDevice, DeviceDiscovery};

/// Interval between enumeration passes while searching
const RESCAN_INTERVAL: Duration = Duration::from_millis(250);

/// HID discovery for Wii Remotes paired with the host
pub struct HidDiscovery {
    /// How long `discover` keeps rescanning while nothing is found
    search_timeout: Duration,
    /// Read timeout handed to every opened device
    read_timeout_ms: u32,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl HidDiscovery {
    /// Create a discovery instance with a 5 second search window
    pub fn new() -> Self {
        Self {
            search_timeout: Duration::from_secs(5),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }

    /// Set how long to keep searching when no device is visible yet
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// Set the read timeout for opened devices
    pub fn with_read_timeout(mut self, ms: u32) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    /// Collect matching interfaces from the current device list, one per path
    fn scan(api: &HidApi) -> Vec<hidapi::DeviceInfo> {
        let mut seen = HashSet::new();
        api.device_list()
            .filter(|d| device_registry::is_wiimote(d.vendor_id(), d.product_id()))
            .filter(|d| seen.insert(d.path().to_owned()))
            .cloned()
            .collect()
    }

    fn to_info(device_info: &hidapi::DeviceInfo) -> DeviceInfo {
        DeviceInfo {
            vid: device_info.vendor_id(),
            pid: device_info.product_id(),
            device_path: device_info.path().to_string_lossy().to_string(),
            serial: device_info
                .serial_number()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            product_name: device_info.product_string().map(|s| s.to_string()),
        }
    }
}

impl DeviceDiscovery for HidDiscovery {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, TransportError> {
        let api = HidApi::new()?;
        let devices: Vec<DeviceInfo> = Self::scan(&api).iter().map(Self::to_info).collect();
        info!("Found {} Wii Remotes", devices.len());
        Ok(devices)
    }

    fn discover(&self, max_count: usize) -> Result<Vec<BoxedDevice>, TransportError> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let mut api = HidApi::new()?;
        let deadline = Instant::now() + self.search_timeout;

        let candidates = loop {
            let found = Self::scan(&api);
            if !found.is_empty() || Instant::now() >= deadline {
                break found;
            }
            std::thread::sleep(RESCAN_INTERVAL);
            if let Err(e) = api.refresh_devices() {
                warn!("Refreshing HID device list failed: {}", e);
            }
        };

        let mut devices: Vec<BoxedDevice> = Vec::with_capacity(max_count.min(candidates.len()));
        for candidate in candidates.iter() {
            if devices.len() >= max_count {
                break;
            }

            let info = Self::to_info(candidate);
            match candidate.open_device(&api) {
                Ok(device) => {
                    debug!(
                        "Opened {:04X}:{:04X} at {}",
                        info.vid, info.pid, info.device_path
                    );
                    let handle = HidWiimote::new(device, info).with_read_timeout(self.read_timeout_ms);
                    devices.push(Box::new(handle));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", info.device_path, TransportError::from(e));
                }
            }
        }

        info!(
            "Discovered {} of {} visible Wii Remotes (max {})",
            devices.len(),
            candidates.len(),
            max_count
        );
        Ok(devices)
    }
}
