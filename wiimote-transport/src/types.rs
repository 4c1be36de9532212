//! Common types for transport layer

use std::fmt;

use crate::protocol::MAX_PAYLOAD;

/// One report slot as exchanged with the device
///
/// The buffer is always `MAX_PAYLOAD` bytes; `len` records how many of
/// them were actually read from or meant for the wire. Bytes past `len`
/// are zero.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Payload {
    bytes: [u8; MAX_PAYLOAD],
    len: usize,
}

impl Payload {
    /// Capture up to `MAX_PAYLOAD` bytes, truncating anything longer
    pub fn from_slice(data: &[u8]) -> Self {
        let len = data.len().min(MAX_PAYLOAD);
        let mut bytes = [0u8; MAX_PAYLOAD];
        bytes[..len].copy_from_slice(&data[..len]);
        Self { bytes, len }
    }

    /// Report ID (first byte)
    pub fn report_id(&self) -> u8 {
        self.bytes[0]
    }

    /// The meaningful bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The full fixed-size slot, zero padded
    pub fn as_slot(&self) -> &[u8; MAX_PAYLOAD] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self {
            bytes: [0u8; MAX_PAYLOAD],
            len: 0,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({:02X?})", self.as_bytes())
    }
}

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// USB/Bluetooth vendor ID
    pub vid: u16,
    /// Product ID
    pub pid: u16,
    /// hidraw path or platform identifier
    pub device_path: String,
    /// Bluetooth address as reported by the HID layer, if any
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl DeviceInfo {
    /// Display name, falling back to the model derived from the PID
    pub fn display_name(&self) -> &str {
        self.product_name
            .as_deref()
            .unwrap_or_else(|| crate::device_registry::model_name(self.pid))
    }
}
