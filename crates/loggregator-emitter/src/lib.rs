//! # Loggregator Emitter
//!
//! Ships application log lines to Loggregator as signed, size-bounded
//! envelopes over UDP.
//!
//! ## Overview
//!
//! Each call to [`Emitter::emit`] or [`Emitter::emit_error`]:
//!
//! 1. Builds a [`LogMessage`], cutting bodies over 7680 bytes and marking
//!    them `TRUNCATED`
//! 2. Signs the body with the key derived from the shared secret
//! 3. Wraps message and signature in a [`LogEnvelope`] routed by app id
//! 4. Encodes the envelope and writes it as a single datagram
//!
//! Delivery is fire-and-forget with no batching or retry,
//! and any failure is returned to the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loggregator_emitter::{Emitter, EmitterConfig};
//!
//! async fn example() {
//!     let config = EmitterConfig::default()
//!         .with_source_name("APP")
//!         .with_source_id("0");
//!
//!     let emitter = Emitter::connect(("loggregator.example.com", 3456), "secret", config)
//!         .await
//!         .unwrap();
//!
//!     emitter.emit("9d8b0b6e-6c3e-4c1b-9a1e-0f5b3f2c7a10", "hello").await.unwrap();
//!     emitter.emit_error("9d8b0b6e-6c3e-4c1b-9a1e-0f5b3f2c7a10", "oops").await.unwrap();
//!
//!     emitter.close().unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `loggregator_emitter::core` - Messages, envelopes, signing, wire encoding
//! - `loggregator_emitter::transport` - Transport trait and implementations

pub mod emitter;
pub mod error;

// Re-export component crates
pub use loggregator_emitter_core as core;
pub use loggregator_emitter_transport as transport;

// Re-export main types for convenience
pub use emitter::{Emitter, EmitterConfig, DEFAULT_SOURCE_ID, DEFAULT_SOURCE_NAME};
pub use error::{EmitterError, Result};

pub use loggregator_emitter_core::{
    AppId, LogEnvelope, LogMessage, MessageSigner, MessageType, ProtobufCodec, Uuid,
    MAX_MESSAGE_BYTES,
};
pub use loggregator_emitter_transport::{Transport, UdpTransport};
