//! Envelope codecs and the CBOR encoding.
//!
//! [`EnvelopeCodec`] turns an envelope into datagram bytes. Loggregator
//! itself reads protobuf (see [`crate::protobuf`]); the CBOR layout below
//! is an alternative for other consumers.
//!
//! Envelopes are encoded as CBOR maps with small integer keys written in
//! ascending order, so the same envelope always produces the same bytes.
//!
//! ```text
//! envelope     { 0: version, 1: routing_key, 2: log_message, 3: signature }
//! log_message  { 0: app_id, 1: message, 2: message_type, 3: timestamp,
//!                4: source_id?, 5: source_name? }
//! ```
//!
//! Optional fields are omitted rather than encoded as null. Decoders ignore
//! keys they do not know.

use bytes::Bytes;
use ciborium::value::Value;

use crate::envelope::LogEnvelope;
use crate::error::{CoreError, Result};
use crate::message::{LogMessage, MessageType};
use crate::types::AppId;

/// Version written under key 0 of a CBOR envelope.
pub const CBOR_SCHEMA_VERSION: u8 = 1;

mod envelope_keys {
    pub const VERSION: u64 = 0;
    pub const ROUTING_KEY: u64 = 1;
    pub const LOG_MESSAGE: u64 = 2;
    pub const SIGNATURE: u64 = 3;
}

mod message_keys {
    pub const APP_ID: u64 = 0;
    pub const MESSAGE: u64 = 1;
    pub const MESSAGE_TYPE: u64 = 2;
    pub const TIMESTAMP: u64 = 3;
    pub const SOURCE_ID: u64 = 4;
    pub const SOURCE_NAME: u64 = 5;
}

/// Serializes envelopes into datagram payloads.
pub trait EnvelopeCodec: Send + Sync {
    /// Encode an envelope to bytes.
    fn encode(&self, envelope: &LogEnvelope) -> Result<Vec<u8>>;
}

/// Compact CBOR codec.
///
/// Not readable by Loggregator receivers; useful for tooling that wants a
/// self-describing format.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl EnvelopeCodec for CborCodec {
    fn encode(&self, envelope: &LogEnvelope) -> Result<Vec<u8>> {
        encode_cbor(envelope)
    }
}

/// Encode an envelope to CBOR bytes.
pub fn encode_cbor(envelope: &LogEnvelope) -> Result<Vec<u8>> {
    let value = envelope_to_value(envelope);
    let mut buf = Vec::new();
    ciborium::into_writer(&value, &mut buf).map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(buf)
}

/// Decode an envelope from CBOR bytes.
///
/// The signature is not checked.
pub fn decode_cbor(bytes: &[u8]) -> Result<LogEnvelope> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::Decoding(e.to_string()))?;
    value_to_envelope(&value)
}

fn key(k: u64) -> Value {
    Value::Integer(k.into())
}

fn envelope_to_value(envelope: &LogEnvelope) -> Value {
    Value::Map(vec![
        (key(envelope_keys::VERSION), Value::Integer(CBOR_SCHEMA_VERSION.into())),
        (
            key(envelope_keys::ROUTING_KEY),
            Value::Text(envelope.routing_key.clone()),
        ),
        (
            key(envelope_keys::LOG_MESSAGE),
            message_to_value(&envelope.log_message),
        ),
        (
            key(envelope_keys::SIGNATURE),
            Value::Bytes(envelope.signature.to_vec()),
        ),
    ])
}

fn message_to_value(message: &LogMessage) -> Value {
    let mut entries = Vec::with_capacity(6);

    entries.push((
        key(message_keys::APP_ID),
        Value::Text(message.app_id.as_str().to_owned()),
    ));
    entries.push((key(message_keys::MESSAGE), Value::Bytes(message.body.to_vec())));
    entries.push((
        key(message_keys::MESSAGE_TYPE),
        Value::Integer(message.message_type.to_i32().into()),
    ));
    entries.push((
        key(message_keys::TIMESTAMP),
        Value::Integer(message.timestamp.into()),
    ));
    if let Some(source_id) = &message.source_id {
        entries.push((key(message_keys::SOURCE_ID), Value::Text(source_id.clone())));
    }
    if let Some(source_name) = &message.source_name {
        entries.push((
            key(message_keys::SOURCE_NAME),
            Value::Text(source_name.clone()),
        ));
    }

    Value::Map(entries)
}

/// Look up a value by integer key.
fn get(map: &[(Value, Value)], k: u64) -> Option<&Value> {
    map.iter()
        .find(|(key, _)| matches!(key, Value::Integer(i) if i128::from(*i) == k as i128))
        .map(|(_, v)| v)
}

fn as_map<'a>(value: &'a Value, what: &str) -> Result<&'a [(Value, Value)]> {
    match value {
        Value::Map(m) => Ok(m),
        _ => Err(CoreError::Decoding(format!("{what}: expected map"))),
    }
}

fn text(map: &[(Value, Value)], k: u64, what: &str) -> Result<Option<String>> {
    match get(map, k) {
        None => Ok(None),
        Some(Value::Text(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CoreError::Decoding(format!("{what}: expected text"))),
    }
}

fn integer(map: &[(Value, Value)], k: u64, what: &str) -> Result<i128> {
    match get(map, k) {
        Some(Value::Integer(i)) => Ok(i128::from(*i)),
        _ => Err(CoreError::Decoding(format!("missing or invalid {what}"))),
    }
}

fn byte_string(map: &[(Value, Value)], k: u64, what: &str) -> Result<Vec<u8>> {
    match get(map, k) {
        Some(Value::Bytes(b)) => Ok(b.clone()),
        _ => Err(CoreError::Decoding(format!("missing or invalid {what}"))),
    }
}

fn value_to_envelope(value: &Value) -> Result<LogEnvelope> {
    let map = as_map(value, "envelope")?;

    let version = integer(map, envelope_keys::VERSION, "version")?;
    if version != i128::from(CBOR_SCHEMA_VERSION) {
        return Err(CoreError::Decoding(format!(
            "unsupported wire version: {version}"
        )));
    }

    let routing_key = text(map, envelope_keys::ROUTING_KEY, "routing_key")?
        .ok_or_else(|| CoreError::Decoding("missing routing_key".into()))?;

    let message_value = get(map, envelope_keys::LOG_MESSAGE)
        .ok_or_else(|| CoreError::Decoding("missing log_message".into()))?;
    let log_message = value_to_message(message_value)?;

    let signature = byte_string(map, envelope_keys::SIGNATURE, "signature")?;

    Ok(LogEnvelope {
        routing_key,
        log_message,
        signature: Bytes::from(signature),
    })
}

fn value_to_message(value: &Value) -> Result<LogMessage> {
    let map = as_map(value, "log_message")?;

    let app_id = text(map, message_keys::APP_ID, "app_id")?
        .ok_or_else(|| CoreError::Decoding("missing app_id".into()))?;

    let body = byte_string(map, message_keys::MESSAGE, "message")?;

    let raw_type = integer(map, message_keys::MESSAGE_TYPE, "message_type")?;
    let message_type = i32::try_from(raw_type)
        .ok()
        .and_then(MessageType::from_i32)
        .ok_or_else(|| CoreError::Decoding(format!("unknown message_type: {raw_type}")))?;

    let raw_timestamp = integer(map, message_keys::TIMESTAMP, "timestamp")?;
    let timestamp = i64::try_from(raw_timestamp)
        .map_err(|_| CoreError::Decoding("timestamp out of range".into()))?;

    Ok(LogMessage {
        app_id: AppId::from(app_id),
        body: Bytes::from(body),
        message_type,
        timestamp,
        source_id: text(map, message_keys::SOURCE_ID, "source_id")?,
        source_name: text(map, message_keys::SOURCE_NAME, "source_name")?,
    })
}
