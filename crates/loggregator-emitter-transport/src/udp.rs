//! Connected UDP transport.

use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::{lookup_host, ToSocketAddrs, UdpSocket};

use crate::error::{Result, TransportError};
use crate::transport::Transport;

/// A UDP socket connected to a single Loggregator endpoint.
///
/// In blocking mode a write waits until the socket can accept the datagram.
/// In non-blocking mode a write that cannot complete immediately fails with
/// [`TransportError::Write`] instead of waiting.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
    blocking: bool,
}

impl UdpTransport {
    /// Open a socket and connect it to `addr`.
    ///
    /// Resolves the address, binds an ephemeral local port, connects, and
    /// registers the socket with the tokio reactor. If any step fails the
    /// socket opened so far is closed before the error is returned.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn connect<A: ToSocketAddrs>(addr: A, blocking: bool) -> Result<Self> {
        let peer = lookup_host(addr)
            .await
            .map_err(|e| TransportError::Init(format!("resolve: {e}")))?
            .next()
            .ok_or_else(|| TransportError::Init("address resolved to nothing".into()))?;
        if peer.port() == 0 {
            return Err(TransportError::Init(format!("{peer}: port 0 is not a valid peer")));
        }

        let socket = std::net::UdpSocket::bind(unspecified_for(&peer))
            .map_err(|e| TransportError::Init(format!("open: {e}")))?;

        // From here on an early return drops `socket`, which closes it.
        socket
            .connect(peer)
            .map_err(|e| TransportError::Init(format!("connect {peer}: {e}")))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| TransportError::Init(format!("configure: {e}")))?;
        let socket = UdpSocket::from_std(socket)
            .map_err(|e| TransportError::Init(format!("configure: {e}")))?;

        // Prime write readiness so the first non-blocking write can succeed.
        socket
            .writable()
            .await
            .map_err(|e| TransportError::Init(format!("configure: {e}")))?;

        tracing::debug!(%peer, blocking, "udp transport connected");
        Ok(Self {
            socket,
            peer,
            blocking,
        })
    }

    /// Whether writes wait for socket readiness.
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// The local address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| TransportError::Init(e.to_string()))
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn write(&self, datagram: &[u8]) -> Result<usize> {
        let sent = if self.blocking {
            self.socket.send(datagram).await
        } else {
            self.socket.try_send(datagram)
        };
        let written = sent.map_err(|e| TransportError::Write(e.to_string()))?;

        if written != datagram.len() {
            return Err(TransportError::PartialWrite {
                written,
                expected: datagram.len(),
            });
        }

        tracing::trace!(peer = %self.peer, bytes = written, "datagram sent");
        Ok(written)
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }

    fn close(self) -> Result<()> {
        tracing::debug!(peer = %self.peer, "udp transport closed");
        drop(self.socket);
        Ok(())
    }
}

/// Wildcard local address in the peer's address family.
fn unspecified_for(peer: &SocketAddr) -> SocketAddr {
    match peer {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}
