//! # Loggregator Emitter Transport
//!
//! The datagram side of the emitter: a [`Transport`] trait, a connected UDP
//! implementation, and an in-memory implementation for tests.
//!
//! ## Overview
//!
//! Delivery is fire-and-forget. A transport writes one datagram per call
//! and reports failures to the caller; it never buffers, batches, or
//! retries.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loggregator_emitter_transport::{Transport, UdpTransport};
//!
//! async fn example() {
//!     let transport = UdpTransport::connect("127.0.0.1:3456", false).await.unwrap();
//!     transport.write(b"datagram").await.unwrap();
//!     transport.close().unwrap();
//! }
//! ```

pub mod error;
pub mod transport;
pub mod udp;

pub use error::{Result, TransportError};
pub use transport::{memory::MemorySink, memory::MemoryTransport, Transport};
pub use udp::UdpTransport;
