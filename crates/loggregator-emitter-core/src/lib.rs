//! # Loggregator Emitter Core
//!
//! Pure primitives for shipping log lines to Loggregator: message framing,
//! the size ceiling, envelope signing, and wire encoding.
//!
//! This crate performs no I/O. See `loggregator-emitter-transport` for the
//! datagram side.
//!
//! ## Key Types
//!
//! - [`LogMessage`] - A typed, size-bounded log line
//! - [`LogEnvelope`] - A message with its routing key and signature
//! - [`MessageSigner`] - Derives the key from the shared secret and signs bodies
//! - [`AppId`] - Application identifier, from a string or a UUID
//!
//! ## Signing
//!
//! Envelopes are authenticated with an encrypted, padded digest rather than
//! a MAC. See [`crypto`] for the exact construction.
//!
//! ## Wire Format
//!
//! [`encode_envelope`] writes the protobuf `LogEnvelope` Loggregator
//! receivers expect. [`CborCodec`] is available for other consumers.
//!
//! ## Usage
//!
//! ```rust
//! use loggregator_emitter_core::{
//!     build_message, encode_envelope, LogEnvelope, MessageSigner, MessageType,
//! };
//!
//! let signer = MessageSigner::new("shared-secret").unwrap();
//! let message = build_message("app-guid", "hello", MessageType::Out, Some("0"), Some("APP"));
//! let envelope = LogEnvelope::build(message, &signer).unwrap();
//! let datagram = encode_envelope(&envelope).unwrap();
//! assert!(!datagram.is_empty());
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod message;
pub mod protobuf;
pub mod types;
pub mod wire;

pub use crypto::{pad, unpad, MessageSigner, Sha256Digest, SigningKey, BLOCK_SIZE, IV_LEN};
pub use envelope::LogEnvelope;
pub use error::{CoreError, Result};
pub use message::{
    build_message, truncate_body, LogMessage, LogMessageBuilder, MessageType, MAX_MESSAGE_BYTES,
    TRUNCATED_MARKER,
};
pub use protobuf::{decode_envelope, encode_envelope, ProtobufCodec};
pub use types::AppId;
pub use wire::{decode_cbor, encode_cbor, CborCodec, EnvelopeCodec, CBOR_SCHEMA_VERSION};

pub use uuid::Uuid;
