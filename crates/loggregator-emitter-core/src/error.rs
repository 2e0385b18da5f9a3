//! Error types for the emitter core.

use thiserror::Error;

/// Errors that can occur while signing or encoding envelopes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The digest or block cipher could not be set up from the shared secret.
    #[error("crypto initialization failed: {0}")]
    CryptoInit(String),

    /// The block cipher failed while producing a signature.
    #[error("crypto operation failed: {0}")]
    CryptoOperation(String),

    /// Padded plaintext did not end in `0x80` followed by zero bytes.
    #[error("bad padding")]
    BadPadding,

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
