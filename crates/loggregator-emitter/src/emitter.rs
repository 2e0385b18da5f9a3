//! The Emitter: public entry point for shipping log lines.
//!
//! An emitter owns one transport and one signing key, both fixed at
//! construction. Each call builds one envelope and attempts exactly one
//! datagram write.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::net::ToSocketAddrs;

use loggregator_emitter_core::{
    build_message, AppId, EnvelopeCodec, LogEnvelope, MessageSigner, MessageType, ProtobufCodec,
};
use loggregator_emitter_transport::{Transport, UdpTransport};

use crate::error::Result;

/// Default source name attached to every message.
pub const DEFAULT_SOURCE_NAME: &str = "UNKNOWN";

/// Default source instance id attached to every message.
pub const DEFAULT_SOURCE_ID: &str = "0";

/// Construction-time configuration for an [`Emitter`].
///
/// Applies uniformly to every message the emitter sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Wait for the socket to accept each datagram instead of failing fast.
    pub blocking: bool,
    /// Source name attached to messages; omitted when `None`.
    pub source_name: Option<String>,
    /// Source instance id attached to messages; omitted when `None`.
    pub source_id: Option<String>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            blocking: false,
            source_name: Some(DEFAULT_SOURCE_NAME.to_owned()),
            source_id: Some(DEFAULT_SOURCE_ID.to_owned()),
        }
    }
}

impl EmitterConfig {
    pub fn with_blocking(self, blocking: bool) -> Self {
        Self { blocking, ..self }
    }

    pub fn with_source_name(self, source_name: impl Into<String>) -> Self {
        Self {
            source_name: Some(source_name.into()),
            ..self
        }
    }

    pub fn with_source_id(self, source_id: impl Into<String>) -> Self {
        Self {
            source_id: Some(source_id.into()),
            ..self
        }
    }
}

/// Client for emitting log lines to Loggregator.
///
/// The emitter is immutable after construction. It is `Send + Sync` when
/// its transport is, and [`UdpTransport`] accepts concurrent writers, so an
/// `Arc<Emitter>` can be shared between tasks.
pub struct Emitter<T: Transport = UdpTransport> {
    transport: T,
    signer: MessageSigner,
    codec: Box<dyn EnvelopeCodec>,
    config: EmitterConfig,
}

impl Emitter<UdpTransport> {
    /// Connect to a Loggregator endpoint over UDP.
    ///
    /// `addr` may be a socket address, a `"host:port"` string, or a
    /// `(host, port)` pair. Fails with a transport init error if the
    /// address cannot be resolved or the socket cannot be opened,
    /// connected, or configured; no socket is left open in that case.
    pub async fn connect<A: ToSocketAddrs>(
        addr: A,
        secret: &str,
        config: EmitterConfig,
    ) -> Result<Self> {
        let transport = UdpTransport::connect(addr, config.blocking).await?;
        Self::with_transport(transport, secret, config)
    }
}

impl<T: Transport> Emitter<T> {
    /// Create an emitter over an already opened transport.
    ///
    /// If the signing key cannot be set up the transport is closed before
    /// the error is returned.
    pub fn with_transport(transport: T, secret: &str, config: EmitterConfig) -> Result<Self> {
        let signer = match MessageSigner::new(secret) {
            Ok(signer) => signer,
            Err(e) => {
                let _ = transport.close();
                return Err(e.into());
            }
        };

        Ok(Self {
            transport,
            signer,
            codec: Box::new(ProtobufCodec),
            config,
        })
    }

    /// Replace the envelope encoder. Defaults to [`ProtobufCodec`].
    pub fn with_codec(self, codec: impl EnvelopeCodec + 'static) -> Self {
        Self {
            codec: Box::new(codec),
            ..self
        }
    }

    /// Emit a standard-output log line.
    pub async fn emit(&self, app_id: impl Into<AppId>, message: &str) -> Result<()> {
        self.send(app_id, message, MessageType::Out).await
    }

    /// Emit a standard-error log line.
    pub async fn emit_error(&self, app_id: impl Into<AppId>, message: &str) -> Result<()> {
        self.send(app_id, message, MessageType::Err).await
    }

    /// Build and write one signed envelope.
    ///
    /// Either the whole datagram is written or an error is returned.
    pub async fn send(
        &self,
        app_id: impl Into<AppId>,
        message: &str,
        message_type: MessageType,
    ) -> Result<()> {
        let log_message = build_message(
            app_id,
            message,
            message_type,
            self.config.source_id.as_deref(),
            self.config.source_name.as_deref(),
        );
        let envelope = LogEnvelope::build(log_message, &self.signer)?;
        let datagram = self.codec.encode(&envelope)?;

        self.transport.write(&datagram).await?;

        tracing::trace!(
            app_id = %envelope.routing_key,
            message_type = ?message_type,
            bytes = datagram.len(),
            "envelope emitted"
        );
        Ok(())
    }

    /// Release the transport.
    pub fn close(self) -> Result<()> {
        Ok(self.transport.close()?)
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("peer", &self.transport.peer_addr())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loggregator_emitter_core::{
        decode_cbor, decode_envelope, CborCodec, CoreError, LogEnvelope, Uuid, MAX_MESSAGE_BYTES,
        TRUNCATED_MARKER,
    };
    use loggregator_emitter_transport::{MemorySink, MemoryTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn memory_emitter(config: EmitterConfig) -> (Emitter<MemoryTransport>, MemorySink) {
        let sink = MemorySink::new();
        let emitter = Emitter::with_transport(sink.transport(), "hunter2", config).unwrap();
        (emitter, sink)
    }

    async fn captured(sink: &MemorySink) -> Vec<LogEnvelope> {
        sink.datagrams()
            .await
            .iter()
            .map(|d| decode_envelope(d).unwrap())
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = EmitterConfig::default();
        assert!(!config.blocking);
        assert_eq!(config.source_name.as_deref(), Some("UNKNOWN"));
        assert_eq!(config.source_id.as_deref(), Some("0"));
    }

    #[test]
    fn test_config_builders_return_new_values() {
        let base = EmitterConfig::default();
        let custom = base
            .clone()
            .with_blocking(true)
            .with_source_name("APP")
            .with_source_id("3");

        assert_eq!(base, EmitterConfig::default());
        assert!(custom.blocking);
        assert_eq!(custom.source_name.as_deref(), Some("APP"));
        assert_eq!(custom.source_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: EmitterConfig = serde_json::from_str(r#"{"blocking": true}"#).unwrap();
        assert!(config.blocking);
        assert_eq!(config.source_name.as_deref(), Some("UNKNOWN"));
    }

    #[tokio::test]
    async fn test_emit_hello_world() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        emitter.emit("app-123", "hello world").await.unwrap();

        let envelopes = captured(&sink).await;
        assert_eq!(envelopes.len(), 1);
        let envelope = &envelopes[0];
        assert_eq!(envelope.routing_key, "app-123");
        assert_eq!(envelope.log_message.message_type, MessageType::Out);
        assert_eq!(&envelope.log_message.body[..], b"hello world");
        assert_eq!(envelope.signature.len(), 64);
        assert_eq!(envelope.log_message.source_name.as_deref(), Some("UNKNOWN"));
        assert_eq!(envelope.log_message.source_id.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_emit_error_type() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        emitter.emit_error("app", "boom").await.unwrap();

        let envelopes = captured(&sink).await;
        assert_eq!(envelopes[0].log_message.message_type, MessageType::Err);
    }

    #[tokio::test]
    async fn test_uuid_and_string_app_ids_match() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        let uuid = Uuid::from_u128(1);

        emitter.emit(uuid, "same").await.unwrap();
        emitter
            .emit("00000000-0000-0000-0000-000000000001", "same")
            .await
            .unwrap();

        let envelopes = captured(&sink).await;
        assert_eq!(envelopes[0].routing_key, envelopes[1].routing_key);
        assert_eq!(envelopes[0].log_message.app_id, envelopes[1].log_message.app_id);
        assert_eq!(envelopes[0].log_message.body, envelopes[1].log_message.body);
    }

    #[tokio::test]
    async fn test_source_fields_omitted_when_unset() {
        let config = EmitterConfig {
            source_name: None,
            source_id: None,
            ..EmitterConfig::default()
        };
        let (emitter, sink) = memory_emitter(config);
        emitter.emit("app", "bare").await.unwrap();

        let envelopes = captured(&sink).await;
        assert!(envelopes[0].log_message.source_name.is_none());
        assert!(envelopes[0].log_message.source_id.is_none());
    }

    #[tokio::test]
    async fn test_long_message_truncated() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        emitter.emit("app", &"y".repeat(10_000)).await.unwrap();

        let body = captured(&sink).await.remove(0).log_message.body;
        assert_eq!(body.len(), MAX_MESSAGE_BYTES);
        assert!(body.ends_with(TRUNCATED_MARKER));
    }

    #[tokio::test]
    async fn test_empty_message_still_sent() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        emitter.emit("app", "").await.unwrap();

        let envelopes = captured(&sink).await;
        assert_eq!(envelopes.len(), 1);
        assert!(envelopes[0].log_message.body.is_empty());
        assert_eq!(envelopes[0].signature.len(), 64);
    }

    #[tokio::test]
    async fn test_one_write_per_call() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        for i in 0..5 {
            emitter.emit("app", &format!("line {i}")).await.unwrap();
        }
        assert_eq!(sink.len().await, 5);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_and_is_not_queued() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());

        sink.fail_writes(true);
        let err = emitter.emit("app", "dropped").await.unwrap_err();
        assert!(err.is_transport_write());
        assert!(!err.is_transport_init());

        sink.fail_writes(false);
        emitter.emit("app", "delivered").await.unwrap();

        let envelopes = captured(&sink).await;
        assert_eq!(envelopes.len(), 1);
        assert_eq!(&envelopes[0].log_message.body[..], b"delivered");
    }

    #[tokio::test]
    async fn test_close_releases_transport() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        emitter.close().unwrap();
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn test_default_codec_writes_protobuf() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        emitter.emit("app-123", "hello world").await.unwrap();

        let datagram = sink.datagrams().await.remove(0);
        // Field 1 (routing_key), length 7.
        assert_eq!(&datagram[..9], b"\x0a\x07app-123");
        assert!(decode_cbor(&datagram).is_err());
    }

    #[tokio::test]
    async fn test_cbor_codec_can_replace_protobuf() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        let emitter = emitter.with_codec(CborCodec);
        emitter.emit("app", "as cbor").await.unwrap();

        let datagram = sink.datagrams().await.remove(0);
        let envelope = decode_cbor(&datagram).unwrap();
        assert_eq!(&envelope.log_message.body[..], b"as cbor");
    }

    struct FailingCodec;

    impl EnvelopeCodec for FailingCodec {
        fn encode(&self, _: &LogEnvelope) -> loggregator_emitter_core::Result<Vec<u8>> {
            Err(CoreError::Encoding("refused".into()))
        }
    }

    #[tokio::test]
    async fn test_encoding_failure_sends_nothing() {
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        let emitter = emitter.with_codec(FailingCodec);

        let err = emitter.emit("app", "never sent").await.unwrap_err();
        assert!(matches!(err, crate::EmitterError::Core(CoreError::Encoding(_))));
        assert!(sink.is_empty().await);
    }

    struct CountingCodec(Arc<AtomicUsize>);

    impl EnvelopeCodec for CountingCodec {
        fn encode(&self, envelope: &LogEnvelope) -> loggregator_emitter_core::Result<Vec<u8>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            ProtobufCodec.encode(envelope)
        }
    }

    #[tokio::test]
    async fn test_custom_codec_is_used() {
        let count = Arc::new(AtomicUsize::new(0));
        let (emitter, sink) = memory_emitter(EmitterConfig::default());
        let emitter = emitter.with_codec(CountingCodec(Arc::clone(&count)));

        emitter.emit("app", "counted").await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(sink.len().await, 1);
    }

    #[test]
    fn test_emitter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Emitter<UdpTransport>>();
        assert_send_sync::<Emitter<MemoryTransport>>();
    }
}
