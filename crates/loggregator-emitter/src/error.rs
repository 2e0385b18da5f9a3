//! Error types for the emitter.

use loggregator_emitter_core::CoreError;
use loggregator_emitter_transport::TransportError;
use thiserror::Error;

/// Errors surfaced by [`Emitter`](crate::Emitter) operations.
///
/// Every failure reaches the caller. Nothing is retried or queued.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// Signing or encoding failed.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl EmitterError {
    /// The transport could not be set up.
    pub fn is_transport_init(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Init(_)))
    }

    /// A datagram could not be written in full.
    pub fn is_transport_write(&self) -> bool {
        matches!(
            self,
            Self::Transport(TransportError::Write(_) | TransportError::PartialWrite { .. })
        )
    }

    /// Key derivation or signing failed.
    pub fn is_crypto(&self) -> bool {
        matches!(
            self,
            Self::Core(
                CoreError::CryptoInit(_) | CoreError::CryptoOperation(_) | CoreError::BadPadding
            )
        )
    }
}

/// Result type for emitter operations.
pub type Result<T> = std::result::Result<T, EmitterError>;
