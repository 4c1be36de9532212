//! Device registry - known Wii Remote identifiers

/// Nintendo vendor ID
pub const VENDOR_ID: u16 = 0x057E;

/// Original Wii Remote (RVL-CNT-01)
pub const PID_WIIMOTE: u16 = 0x0306;

/// Wii Remote Plus with built-in MotionPlus (RVL-CNT-01-TR)
pub const PID_WIIMOTE_PLUS: u16 = 0x0330;

/// All product IDs the bridge will open
pub const WIIMOTE_PIDS: &[u16] = &[PID_WIIMOTE, PID_WIIMOTE_PLUS];

/// Check if a VID/PID pair is a supported Wii Remote
#[inline]
pub fn is_wiimote(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && WIIMOTE_PIDS.contains(&pid)
}

/// Model name for a product ID
pub fn model_name(pid: u16) -> &'static str {
    match pid {
        PID_WIIMOTE => "Nintendo RVL-CNT-01",
        PID_WIIMOTE_PLUS => "Nintendo RVL-CNT-01-TR",
        _ => "Unknown",
    }
}
