//! Protocol constants and utilities for Wii Remote communication

use std::fmt;

/// Size of one report slot (report ID + data), matching the largest
/// Wii Remote input report with headroom.
pub const MAX_PAYLOAD: usize = 32;

/// Input reports with an ID at or above this value are periodic data
/// reports; everything below is a one-off status/ack/memory reply.
pub const CONTINUOUS_REPORT_THRESHOLD: u8 = 0x30;

/// Bluetooth HID transaction header
///
/// Upper nibble is the transaction type, lower nibble the parameter.
pub mod hid {
    /// DATA transaction
    pub const TYPE_DATA: u8 = 0xA;
    /// Parameter: input report (device → host)
    pub const PARAM_INPUT: u8 = 0x1;
    /// Parameter: output report (host → device)
    pub const PARAM_OUTPUT: u8 = 0x2;

    /// Pack a transaction type and parameter into a header byte
    #[inline]
    pub const fn header(kind: u8, param: u8) -> u8 {
        (kind << 4) | (param & 0x0F)
    }

    /// Header prefixed to every input report handed to the host (0xA1)
    pub const DATA_INPUT: u8 = header(TYPE_DATA, PARAM_INPUT);
    /// Header the host prefixes to every output report (0xA2)
    pub const DATA_OUTPUT: u8 = header(TYPE_DATA, PARAM_OUTPUT);
}

/// Output report IDs (host → Wii Remote)
pub mod output {
    pub const RUMBLE: u8 = 0x10;
    pub const LEDS: u8 = 0x11;
    pub const REPORT_MODE: u8 = 0x12;
    pub const IR_ENABLE: u8 = 0x13;
    pub const SPEAKER_ENABLE: u8 = 0x14;
    pub const STATUS_REQUEST: u8 = 0x15;
    pub const WRITE_DATA: u8 = 0x16;
    pub const READ_DATA: u8 = 0x17;
    pub const SPEAKER_DATA: u8 = 0x18;
    pub const SPEAKER_MUTE: u8 = 0x19;
    pub const IR_ENABLE_2: u8 = 0x1A;
}

/// Input report IDs (Wii Remote → host)
pub mod input {
    pub const STATUS: u8 = 0x20;
    pub const READ_DATA_REPLY: u8 = 0x21;
    pub const ACK: u8 = 0x22;
    pub const BUTTONS: u8 = 0x30;
    pub const BUTTONS_ACCEL: u8 = 0x31;
    pub const BUTTONS_EXT8: u8 = 0x32;
    pub const BUTTONS_ACCEL_IR12: u8 = 0x33;
    pub const BUTTONS_EXT19: u8 = 0x34;
    pub const BUTTONS_ACCEL_EXT16: u8 = 0x35;
    pub const BUTTONS_IR10_EXT9: u8 = 0x36;
    pub const BUTTONS_ACCEL_IR10_EXT6: u8 = 0x37;
    pub const EXT21: u8 = 0x3D;
    pub const INTERLEAVED_A: u8 = 0x3E;
    pub const INTERLEAVED_B: u8 = 0x3F;

    /// Get human-readable name for an input report ID
    pub fn name(id: u8) -> &'static str {
        match id {
            STATUS => "STATUS",
            READ_DATA_REPLY => "READ_DATA_REPLY",
            ACK => "ACK",
            BUTTONS => "BUTTONS",
            BUTTONS_ACCEL => "BUTTONS_ACCEL",
            BUTTONS_EXT8 => "BUTTONS_EXT8",
            BUTTONS_ACCEL_IR12 => "BUTTONS_ACCEL_IR12",
            BUTTONS_EXT19 => "BUTTONS_EXT19",
            BUTTONS_ACCEL_EXT16 => "BUTTONS_ACCEL_EXT16",
            BUTTONS_IR10_EXT9 => "BUTTONS_IR10_EXT9",
            BUTTONS_ACCEL_IR10_EXT6 => "BUTTONS_ACCEL_IR10_EXT6",
            EXT21 => "EXT21",
            INTERLEAVED_A => "INTERLEAVED_A",
            INTERLEAVED_B => "INTERLEAVED_B",
            _ => "UNKNOWN",
        }
    }
}

/// Whether an input report ID belongs to the periodic data reports
#[inline]
pub fn is_continuous_report(report_id: u8) -> bool {
    report_id >= CONTINUOUS_REPORT_THRESHOLD
}

/// Player LED mask as carried in output report 0x11
///
/// LEDs 1-4 live in the upper nibble; bit 0 is the rumble flag and
/// is always left clear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Leds(u8);

impl Leds {
    pub const NONE: Leds = Leds(0x00);
    pub const LED_1: Leds = Leds(0x10);
    pub const LED_2: Leds = Leds(0x20);
    pub const LED_3: Leds = Leds(0x40);
    pub const LED_4: Leds = Leds(0x80);

    /// Build a mask from 1-based LED numbers, ignoring anything outside 1-4
    pub fn from_numbers(numbers: &[u8]) -> Self {
        numbers
            .iter()
            .filter(|n| (1..=4).contains(*n))
            .fold(Self::NONE, |acc, n| Leds(acc.0 | (0x10 << (n - 1))))
    }

    /// Raw mask byte
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether the given 1-based LED is lit
    pub fn is_lit(self, number: u8) -> bool {
        (1..=4).contains(&number) && self.0 & (0x10 << (number - 1)) != 0
    }
}

impl std::ops::BitOr for Leds {
    type Output = Leds;

    fn bitor(self, rhs: Leds) -> Leds {
        Leds(self.0 | rhs.0)
    }
}

impl fmt::Display for Leds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in 1..=4 {
            f.write_str(if self.is_lit(n) { "*" } else { "-" })?;
        }
        Ok(())
    }
}

/// Build the output report that sets the player LEDs
pub fn build_led_report(leds: Leds) -> [u8; 2] {
    [output::LEDS, leds.bits()]
}

/// Build the output report that selects the data reporting mode
///
/// With `continuous` set the remote sends reports at a fixed rate
/// instead of only on change.
pub fn build_report_mode(mode: u8, continuous: bool) -> [u8; 3] {
    [output::REPORT_MODE, if continuous { 0x04 } else { 0x00 }, mode]
}
