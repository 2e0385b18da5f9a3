//! Proptest generators for property-based testing.

use proptest::prelude::*;
use uuid::Uuid;

use loggregator_emitter_core::{AppId, MessageType, MAX_MESSAGE_BYTES};

/// Generate a shared secret, including empty and non-ASCII ones.
pub fn secret() -> impl Strategy<Value = String> {
    ".{0,64}".prop_map(String::from)
}

/// Generate a UUID.
pub fn uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Generate an app id from either a free-form string or a UUID.
pub fn app_id() -> impl Strategy<Value = AppId> {
    prop_oneof![
        "[a-z0-9-]{1,40}".prop_map(AppId::from),
        uuid().prop_map(AppId::from),
    ]
}

/// Generate a message type.
pub fn message_type() -> impl Strategy<Value = MessageType> {
    prop_oneof![Just(MessageType::Out), Just(MessageType::Err)]
}

/// Generate log text that fits under the size ceiling.
pub fn short_text() -> impl Strategy<Value = String> {
    ".{0,256}".prop_map(String::from)
}

/// Generate ASCII log text around and beyond the size ceiling.
pub fn long_text() -> impl Strategy<Value = String> {
    (MAX_MESSAGE_BYTES - 16..MAX_MESSAGE_BYTES * 2).prop_map(|len| "l".repeat(len))
}

/// Generate text made of multi-byte characters that exceeds the ceiling.
pub fn oversized_multibyte_text() -> impl Strategy<Value = String> {
    (prop::sample::select(vec!['é', '€', '𝄞']), 3000usize..6000)
        .prop_map(|(c, n)| std::iter::repeat(c).take(n).collect())
}
