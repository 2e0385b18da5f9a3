//! Test fixtures and helpers.
//!
//! Common setup for tests that drive an emitter without a network.

use loggregator_emitter::{Emitter, EmitterConfig};
use loggregator_emitter_core::{decode_envelope, LogEnvelope};
use loggregator_emitter_transport::{MemorySink, MemoryTransport};

/// Secret used by fixtures unless one is given.
pub const DEFAULT_SECRET: &str = "hunter2";

/// An emitter wired to an in-memory sink.
pub struct EmitterFixture {
    pub emitter: Emitter<MemoryTransport>,
    pub sink: MemorySink,
    pub secret: String,
}

impl EmitterFixture {
    /// Create a fixture with the default secret and configuration.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_SECRET, EmitterConfig::default())
    }

    /// Create a fixture with a specific secret and configuration.
    pub fn with_config(secret: &str, config: EmitterConfig) -> Self {
        let sink = MemorySink::new();
        let emitter =
            Emitter::with_transport(sink.transport(), secret, config).expect("emitter setup");
        Self {
            emitter,
            sink,
            secret: secret.to_owned(),
        }
    }

    /// Decode every datagram written so far.
    pub async fn envelopes(&self) -> Vec<LogEnvelope> {
        self.sink
            .datagrams()
            .await
            .iter()
            .map(|d| decode_envelope(d).expect("captured datagram decodes"))
            .collect()
    }

    /// Decode the most recent datagram.
    pub async fn last_envelope(&self) -> Option<LogEnvelope> {
        self.envelopes().await.pop()
    }
}

impl Default for EmitterFixture {
    fn default() -> Self {
        Self::new()
    }
}
