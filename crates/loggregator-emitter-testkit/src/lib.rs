//! # Loggregator Emitter Testkit
//!
//! Testing utilities for the Loggregator emitter.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed inputs and IVs with the exact
//!   signature bytes a compatible receiver expects
//! - **Generators**: Proptest strategies for secrets, app ids, and log text
//! - **Fixtures**: An emitter wired to an in-memory sink
//!
//! ## Golden Vectors
//!
//! ```rust
//! use loggregator_emitter_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, signature) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, signature);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use loggregator_emitter_testkit::generators::{app_id, short_text};
//!
//! proptest! {
//!     #[test]
//!     fn routing_key_is_app_id(id in app_id(), text in short_text()) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use loggregator_emitter_testkit::fixtures::EmitterFixture;
//!
//! # async fn example() {
//! let fixture = EmitterFixture::new();
//! fixture.emitter.emit("app", "hello").await.unwrap();
//! let envelope = fixture.last_envelope().await.unwrap();
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{EmitterFixture, DEFAULT_SECRET};
pub use vectors::{all_vectors, decrypt_signature, verify_all_vectors, GoldenVector};
