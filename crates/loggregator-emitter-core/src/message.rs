//! Log messages: the typed, size-bounded payload of an envelope.
//!
//! A message body never exceeds [`MAX_MESSAGE_BYTES`]. Longer bodies are cut
//! at a byte boundary (which may split a UTF-8 character) and end with
//! [`TRUNCATED_MARKER`].

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::types::AppId;

/// Maximum size of a message body in bytes.
///
/// Leaves 512 bytes of an 8 KiB datagram for envelope metadata.
pub const MAX_MESSAGE_BYTES: usize = 8 * 1024 - 512;

/// Literal appended to a truncated body.
pub const TRUNCATED_MARKER: &[u8] = b"TRUNCATED";

/// Which output stream a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MessageType {
    /// Standard output.
    Out = 1,
    /// Standard error.
    Err = 2,
}

impl MessageType {
    /// Convert to the wire integer.
    pub fn to_i32(self) -> i32 {
        self as i32
    }

    /// Try to parse from the wire integer.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Out),
            2 => Some(Self::Err),
            _ => None,
        }
    }
}

/// A single log line addressed to an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// The application the line belongs to.
    pub app_id: AppId,

    /// Message bytes, at most [`MAX_MESSAGE_BYTES`].
    pub body: Bytes,

    pub message_type: MessageType,

    /// Wall-clock time in nanoseconds since the Unix epoch (millisecond precision).
    pub timestamp: i64,

    /// Instance id of the emitting source.
    pub source_id: Option<String>,

    /// Name of the emitting source.
    pub source_name: Option<String>,
}

impl LogMessage {
    /// Start building a message.
    pub fn builder(app_id: impl Into<AppId>, message_type: MessageType) -> LogMessageBuilder {
        LogMessageBuilder::new(app_id, message_type)
    }

    /// Whether the body was cut to fit [`MAX_MESSAGE_BYTES`].
    pub fn was_truncated(&self) -> bool {
        self.body.len() == MAX_MESSAGE_BYTES && self.body.ends_with(TRUNCATED_MARKER)
    }
}

/// Builder for [`LogMessage`].
///
/// The size ceiling is applied in [`build`](Self::build), so a builder can
/// be fed text of any length.
#[derive(Debug, Clone)]
pub struct LogMessageBuilder {
    app_id: AppId,
    message_type: MessageType,
    body: Bytes,
    timestamp: Option<i64>,
    source_id: Option<String>,
    source_name: Option<String>,
}

impl LogMessageBuilder {
    /// Create a builder with an empty body.
    pub fn new(app_id: impl Into<AppId>, message_type: MessageType) -> Self {
        Self {
            app_id: app_id.into(),
            message_type,
            body: Bytes::new(),
            timestamp: None,
            source_id: None,
            source_name: None,
        }
    }

    /// Set the body from text (its UTF-8 bytes).
    pub fn text(mut self, text: &str) -> Self {
        self.body = Bytes::copy_from_slice(text.as_bytes());
        self
    }

    /// Set the body from raw bytes.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the timestamp in nanoseconds. Defaults to now.
    pub fn timestamp(mut self, nanos: i64) -> Self {
        self.timestamp = Some(nanos);
        self
    }

    pub fn source_id(mut self, source_id: Option<String>) -> Self {
        self.source_id = source_id;
        self
    }

    pub fn source_name(mut self, source_name: Option<String>) -> Self {
        self.source_name = source_name;
        self
    }

    /// Build the message, truncating the body if needed.
    pub fn build(self) -> LogMessage {
        LogMessage {
            app_id: self.app_id,
            body: truncate_body(self.body),
            message_type: self.message_type,
            timestamp: self.timestamp.unwrap_or_else(now_nanos),
            source_id: self.source_id,
            source_name: self.source_name,
        }
    }
}

/// Build a message stamped with the current time.
pub fn build_message(
    app_id: impl Into<AppId>,
    text: &str,
    message_type: MessageType,
    source_id: Option<&str>,
    source_name: Option<&str>,
) -> LogMessage {
    LogMessageBuilder::new(app_id, message_type)
        .text(text)
        .source_id(source_id.map(str::to_owned))
        .source_name(source_name.map(str::to_owned))
        .build()
}

/// Apply the size ceiling to a body.
///
/// Bodies within [`MAX_MESSAGE_BYTES`] are returned unchanged. Longer bodies
/// keep their first `MAX_MESSAGE_BYTES - TRUNCATED_MARKER.len()` bytes
/// followed by the marker.
pub fn truncate_body(body: Bytes) -> Bytes {
    if body.len() <= MAX_MESSAGE_BYTES {
        return body;
    }

    let keep = MAX_MESSAGE_BYTES - TRUNCATED_MARKER.len();
    tracing::debug!(original = body.len(), kept = keep, "truncating log message body");

    let mut truncated = BytesMut::with_capacity(MAX_MESSAGE_BYTES);
    truncated.extend_from_slice(&body[..keep]);
    truncated.extend_from_slice(TRUNCATED_MARKER);
    truncated.freeze()
}

/// Current time in nanoseconds, derived from the millisecond clock.
fn now_nanos() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    millis * 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_max_message_bytes() {
        assert_eq!(MAX_MESSAGE_BYTES, 7680);
    }

    #[test]
    fn test_short_body_unchanged() {
        let msg = LogMessage::builder("app-123", MessageType::Out)
            .text("hello world")
            .build();
        assert_eq!(&msg.body[..], b"hello world");
        assert!(!msg.was_truncated());
    }

    #[test]
    fn test_exact_limit_unchanged() {
        let text = "a".repeat(MAX_MESSAGE_BYTES);
        let msg = build_message("app", &text, MessageType::Out, None, None);
        assert_eq!(msg.body.len(), MAX_MESSAGE_BYTES);
        assert!(!msg.body.ends_with(TRUNCATED_MARKER));
    }

    #[test]
    fn test_ten_thousand_bytes_truncated() {
        let text = "x".repeat(10_000);
        let msg = build_message("app", &text, MessageType::Out, None, None);
        assert_eq!(msg.body.len(), 7680);
        assert!(msg.body.ends_with(b"TRUNCATED"));
        assert!(msg.body[..7680 - 9].iter().all(|&b| b == b'x'));
        assert!(msg.was_truncated());
    }

    #[test]
    fn test_truncation_counts_bytes_not_chars() {
        // 3000 three-byte characters: 9000 bytes but only 3000 chars.
        let text = "€".repeat(3000);
        let msg = build_message("app", &text, MessageType::Err, None, None);
        assert_eq!(msg.body.len(), MAX_MESSAGE_BYTES);
        assert!(msg.body.ends_with(TRUNCATED_MARKER));
    }

    #[test]
    fn test_truncation_may_split_character() {
        // Two-byte characters; 7671 kept bytes ends mid-character.
        let text = "é".repeat(5000);
        let msg = build_message("app", &text, MessageType::Out, None, None);
        assert!(std::str::from_utf8(&msg.body[..MAX_MESSAGE_BYTES - 9]).is_err());
    }

    #[test]
    fn test_timestamp_is_whole_milliseconds() {
        let msg = build_message("app", "hi", MessageType::Out, None, None);
        assert!(msg.timestamp > 0);
        assert_eq!(msg.timestamp % 1_000_000, 0);
    }

    #[test]
    fn test_explicit_timestamp() {
        let msg = LogMessage::builder("app", MessageType::Out)
            .timestamp(42)
            .build();
        assert_eq!(msg.timestamp, 42);
    }

    #[test]
    fn test_source_fields_copied_when_present() {
        let msg = build_message("app", "hi", MessageType::Out, Some("7"), Some("APP"));
        assert_eq!(msg.source_id.as_deref(), Some("7"));
        assert_eq!(msg.source_name.as_deref(), Some("APP"));

        let msg = build_message("app", "hi", MessageType::Out, None, None);
        assert!(msg.source_id.is_none());
        assert!(msg.source_name.is_none());
    }

    #[test]
    fn test_empty_body() {
        let msg = build_message("app", "", MessageType::Out, None, None);
        assert!(msg.body.is_empty());
    }

    #[test]
    fn test_message_type_roundtrip() {
        for t in [MessageType::Out, MessageType::Err] {
            assert_eq!(MessageType::from_i32(t.to_i32()), Some(t));
        }
        assert_eq!(MessageType::from_i32(0), None);
    }

    proptest! {
        #[test]
        fn prop_body_never_exceeds_limit(len in 0usize..20_000) {
            let body = Bytes::from(vec![b'z'; len]);
            let out = truncate_body(body.clone());
            prop_assert!(out.len() <= MAX_MESSAGE_BYTES);
            if len <= MAX_MESSAGE_BYTES {
                prop_assert_eq!(out, body);
            } else {
                prop_assert_eq!(out.len(), MAX_MESSAGE_BYTES);
                prop_assert!(out.ends_with(TRUNCATED_MARKER));
            }
        }
    }
}
