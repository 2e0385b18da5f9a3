//! Protobuf wire encoding for envelopes.
//!
//! This is the format Loggregator receivers read. The messages mirror the
//! `logmessage` protobuf schema field for field:
//!
//! ```text
//! message LogMessage {
//!   enum MessageType { OUT = 1; ERR = 2; }
//!   required bytes       message      = 1;
//!   required MessageType message_type = 2;
//!   required sint64      timestamp    = 3;
//!   required string      app_id       = 4;
//!   optional string      source_id    = 6;
//!   repeated string      drain_urls   = 7;
//!   optional string      source_name  = 8;
//! }
//!
//! message LogEnvelope {
//!   required string     routing_key = 1;
//!   required bytes      signature   = 2;
//!   required LogMessage log_message = 3;
//! }
//! ```
//!
//! Emitters never set `drain_urls`.

use bytes::Bytes;
use prost::Message;

use crate::envelope::LogEnvelope;
use crate::error::{CoreError, Result};
use crate::message::{LogMessage, MessageType};
use crate::types::AppId;
use crate::wire::EnvelopeCodec;

#[derive(Clone, PartialEq, Message)]
struct ProtoLogMessage {
    #[prost(bytes = "vec", required, tag = "1")]
    message: Vec<u8>,
    /// `MessageType` enum; enums share the int32 varint encoding.
    #[prost(int32, required, tag = "2")]
    message_type: i32,
    #[prost(sint64, required, tag = "3")]
    timestamp: i64,
    #[prost(string, required, tag = "4")]
    app_id: String,
    #[prost(string, optional, tag = "6")]
    source_id: Option<String>,
    #[prost(string, repeated, tag = "7")]
    drain_urls: Vec<String>,
    #[prost(string, optional, tag = "8")]
    source_name: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
struct ProtoLogEnvelope {
    #[prost(string, required, tag = "1")]
    routing_key: String,
    #[prost(bytes = "vec", required, tag = "2")]
    signature: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    log_message: Option<ProtoLogMessage>,
}

/// The Loggregator protobuf codec, used by emitters unless replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl EnvelopeCodec for ProtobufCodec {
    fn encode(&self, envelope: &LogEnvelope) -> Result<Vec<u8>> {
        encode_envelope(envelope)
    }
}

/// Encode an envelope as a Loggregator protobuf `LogEnvelope`.
pub fn encode_envelope(envelope: &LogEnvelope) -> Result<Vec<u8>> {
    let proto = ProtoLogEnvelope {
        routing_key: envelope.routing_key.clone(),
        signature: envelope.signature.to_vec(),
        log_message: Some(message_to_proto(&envelope.log_message)),
    };

    let mut buf = Vec::with_capacity(proto.encoded_len());
    proto
        .encode(&mut buf)
        .map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(buf)
}

/// Decode a Loggregator protobuf `LogEnvelope`.
///
/// The signature is not checked.
pub fn decode_envelope(bytes: &[u8]) -> Result<LogEnvelope> {
    let proto =
        ProtoLogEnvelope::decode(bytes).map_err(|e| CoreError::Decoding(e.to_string()))?;

    let message = proto
        .log_message
        .ok_or_else(|| CoreError::Decoding("missing log_message".into()))?;

    Ok(LogEnvelope {
        routing_key: proto.routing_key,
        log_message: proto_to_message(message)?,
        signature: Bytes::from(proto.signature),
    })
}

fn message_to_proto(message: &LogMessage) -> ProtoLogMessage {
    ProtoLogMessage {
        message: message.body.to_vec(),
        message_type: message.message_type.to_i32(),
        timestamp: message.timestamp,
        app_id: message.app_id.as_str().to_owned(),
        source_id: message.source_id.clone(),
        drain_urls: Vec::new(),
        source_name: message.source_name.clone(),
    }
}

fn proto_to_message(proto: ProtoLogMessage) -> Result<LogMessage> {
    let message_type = MessageType::from_i32(proto.message_type).ok_or_else(|| {
        CoreError::Decoding(format!("unknown message_type: {}", proto.message_type))
    })?;

    Ok(LogMessage {
        app_id: AppId::from(proto.app_id),
        body: Bytes::from(proto.message),
        message_type,
        timestamp: proto.timestamp,
        source_id: proto.source_id,
        source_name: proto.source_name,
    })
}
