//! Bridge error types

use thiserror::Error;
use wiimote_transport::{TransportError, MAX_PAYLOAD};

/// Errors from bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// No controller is attached to the registry
    #[error("No device available")]
    NoDevice,

    /// Host frame carried no report after the header byte
    #[error("Empty payload")]
    EmptyPayload,

    /// Host frame carried more than one report slot
    #[error("Payload too large: {size} bytes (max {max})", max = MAX_PAYLOAD)]
    PayloadTooLarge { size: usize },

    /// `initialize` called on a registry that already has sessions
    #[error("Bridge already initialized")]
    AlreadyInitialized,

    /// Poll thread could not be started
    #[error("Failed to start poll thread: {0}")]
    PollThread(#[source] std::io::Error),

    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
