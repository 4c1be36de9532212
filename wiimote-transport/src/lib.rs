//! Transport layer for Nintendo Wii Remote communication
//!
//! Wraps the HID device node a paired Wii Remote exposes and provides
//! one-report-at-a-time read and write primitives plus discovery.
//!
//! - HID (hidraw / platform HID via `hidapi`)
//! - Mock (scripted in-memory device, behind the `mock` feature)

pub mod device_registry;
pub mod error;
pub mod protocol;
pub mod types;

mod discovery;
mod hid_wiimote;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use device_registry::{is_wiimote, VENDOR_ID, WIIMOTE_PIDS};
pub use discovery::HidDiscovery;
pub use error::TransportError;
pub use hid_wiimote::HidWiimote;
pub use protocol::{Leds, CONTINUOUS_REPORT_THRESHOLD, MAX_PAYLOAD};
pub use types::{DeviceInfo, Payload};

/// A single physical controller
///
/// Implementations serialize their own I/O; callers may share a handle
/// between threads. `read` blocks for at most the handle's read timeout.
pub trait DeviceHandle: Send + Sync {
    /// Read one input report
    ///
    /// # Returns
    /// `None` on timeout, `Some(report)` if a report arrived
    fn read(&self) -> Result<Option<Payload>, TransportError>;

    /// Write one output report (report ID first, no transaction header)
    fn write(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Set the player indicator LEDs
    fn set_indicator(&self, leds: Leds) -> Result<(), TransportError>;

    /// Get device information
    fn device_info(&self) -> &DeviceInfo;
}

/// Type alias for a boxed device handle
pub type BoxedDevice = Box<dyn DeviceHandle>;

/// Device discovery abstraction
pub trait DeviceDiscovery: Send + Sync {
    /// List currently visible controllers without opening them
    fn list_devices(&self) -> Result<Vec<DeviceInfo>, TransportError>;

    /// Open up to `max_count` controllers
    ///
    /// Finding nothing is not an error; the returned list is empty.
    fn discover(&self, max_count: usize) -> Result<Vec<BoxedDevice>, TransportError>;
}
