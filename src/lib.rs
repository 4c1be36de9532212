// Real Wii Remote bridge - shared library
// Session buffering, poll thread and registry between HID and the host

pub mod config;
pub mod error;
pub mod frame;
pub mod host;
pub mod poll_loop;
pub mod queue;
pub mod registry;
pub mod session;

pub use config::{BridgeConfig, MAX_WIIMOTES};
pub use error::BridgeError;
pub use frame::{input_frame, output_frame, FrameBuilder, HidHeader, INPUT_FRAME_LEN};
pub use host::{InputSink, RecordingSink, StateMode};
pub use poll_loop::PollLoop;
pub use queue::{ReportClass, ReportQueues};
pub use registry::SessionRegistry;
pub use session::{DeviceSession, SessionStats, NO_CHANNEL};
