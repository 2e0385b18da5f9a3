//! Error types for the transport layer.

use thiserror::Error;

/// Errors that can occur while opening or writing to a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel could not be resolved, opened, connected, or configured.
    #[error("transport initialization failed: {0}")]
    Init(String),

    /// A datagram write failed. Not retried.
    #[error("transport write failed: {0}")]
    Write(String),

    /// The socket accepted fewer bytes than the datagram holds.
    #[error("partial write: {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },

    /// Releasing the channel failed.
    #[error("transport close failed: {0}")]
    Close(String),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
