//! Transport abstraction for shipping datagrams.
//!
//! The emitter needs only a connected, connectionless channel: write one
//! datagram, then eventually release the channel.

use async_trait::async_trait;
use std::net::SocketAddr;

use crate::error::Result;

/// A connected datagram channel.
///
/// Implementations must be thread-safe (Send + Sync) and must allow
/// concurrent `write` calls through a shared reference.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one datagram to the connected peer.
    ///
    /// Returns the number of bytes written, which is always the full
    /// datagram length on success.
    async fn write(&self, datagram: &[u8]) -> Result<usize>;

    /// The connected peer, if the transport has one.
    fn peer_addr(&self) -> Option<SocketAddr>;

    /// Release the channel. Consumes the transport, so it runs at most once.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// An in-memory transport for testing.
///
/// Captures datagrams instead of sending them.
pub mod memory {
    use super::*;
    use crate::error::TransportError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct SinkState {
        datagrams: Mutex<Vec<Vec<u8>>>,
        fail_writes: AtomicBool,
        closed: AtomicBool,
    }

    /// Receiving end of a [`MemoryTransport`].
    #[derive(Clone, Default)]
    pub struct MemorySink {
        state: Arc<SinkState>,
    }

    impl MemorySink {
        /// Create an empty sink.
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a transport that writes into this sink.
        pub fn transport(&self) -> MemoryTransport {
            MemoryTransport {
                state: Arc::clone(&self.state),
            }
        }

        /// All datagrams written so far, in order.
        pub async fn datagrams(&self) -> Vec<Vec<u8>> {
            self.state.datagrams.lock().await.clone()
        }

        /// Number of datagrams written so far.
        pub async fn len(&self) -> usize {
            self.state.datagrams.lock().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.len().await == 0
        }

        /// Make subsequent writes fail with [`TransportError::Write`].
        pub fn fail_writes(&self, fail: bool) {
            self.state.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Whether a transport attached to this sink has been closed.
        pub fn is_closed(&self) -> bool {
            self.state.closed.load(Ordering::SeqCst)
        }
    }

    /// In-memory transport implementation.
    pub struct MemoryTransport {
        state: Arc<SinkState>,
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn write(&self, datagram: &[u8]) -> Result<usize> {
            if self.state.closed.load(Ordering::SeqCst) {
                return Err(TransportError::Write("transport closed".into()));
            }
            if self.state.fail_writes.load(Ordering::SeqCst) {
                return Err(TransportError::Write("simulated write failure".into()));
            }

            self.state.datagrams.lock().await.push(datagram.to_vec());
            Ok(datagram.len())
        }

        fn peer_addr(&self) -> Option<SocketAddr> {
            None
        }

        fn close(self) -> Result<()> {
            self.state.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemorySink;
    use super::*;
    use crate::error::TransportError;

    #[tokio::test]
    async fn test_memory_transport_captures_datagrams() {
        let sink = MemorySink::new();
        let transport = sink.transport();

        assert_eq!(transport.write(b"one").await.unwrap(), 3);
        assert_eq!(transport.write(b"two!").await.unwrap(), 4);

        assert_eq!(sink.datagrams().await, vec![b"one".to_vec(), b"two!".to_vec()]);
    }

    #[tokio::test]
    async fn test_memory_transport_simulated_failure() {
        let sink = MemorySink::new();
        let transport = sink.transport();

        sink.fail_writes(true);
        let err = transport.write(b"lost").await.unwrap_err();
        assert!(matches!(err, TransportError::Write(_)));
        assert!(sink.is_empty().await);

        sink.fail_writes(false);
        transport.write(b"sent").await.unwrap();
        assert_eq!(sink.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_transport_close() {
        let sink = MemorySink::new();
        let transport = sink.transport();
        assert!(!sink.is_closed());

        transport.close().unwrap();
        assert!(sink.is_closed());
    }
}
