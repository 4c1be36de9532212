//! Framing of reports handed to the host
//!
//! Every delivered message is one HID transaction header byte followed by
//! a full report slot.

use wiimote_transport::protocol::{hid, MAX_PAYLOAD};
use wiimote_transport::Payload;

/// Length of a delivered input frame
pub const INPUT_FRAME_LEN: usize = 1 + MAX_PAYLOAD;

/// HID transaction header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidHeader {
    pub kind: u8,
    pub param: u8,
}

impl HidHeader {
    /// DATA | INPUT, the header of every report sent up to the host
    pub const DATA_INPUT: HidHeader = HidHeader {
        kind: hid::TYPE_DATA,
        param: hid::PARAM_INPUT,
    };

    /// DATA | OUTPUT, the header the host puts on reports for the device
    pub const DATA_OUTPUT: HidHeader = HidHeader {
        kind: hid::TYPE_DATA,
        param: hid::PARAM_OUTPUT,
    };

    pub fn to_byte(self) -> u8 {
        hid::header(self.kind, self.param)
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            kind: byte >> 4,
            param: byte & 0x0F,
        }
    }
}

/// Builds a sized frame from a header and payload bytes
#[derive(Debug, Default)]
pub struct FrameBuilder {
    buf: Vec<u8>,
}

impl FrameBuilder {
    pub fn new(header: HidHeader) -> Self {
        let mut buf = Vec::with_capacity(INPUT_FRAME_LEN);
        buf.push(header.to_byte());
        Self { buf }
    }

    /// Append the whole fixed-size slot of a payload
    pub fn slot(mut self, payload: &Payload) -> Self {
        self.buf.extend_from_slice(payload.as_slot());
        self
    }

    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.buf.extend_from_slice(data);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Frame an input report for delivery to the host
pub fn input_frame(payload: &Payload) -> Vec<u8> {
    FrameBuilder::new(HidHeader::DATA_INPUT).slot(payload).finish()
}

/// Frame an output report the way the host sends it on a channel
pub fn output_frame(report: &[u8]) -> Vec<u8> {
    FrameBuilder::new(HidHeader::DATA_OUTPUT).bytes(report).finish()
}
