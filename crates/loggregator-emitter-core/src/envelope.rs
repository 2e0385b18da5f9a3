//! Log envelopes: a message plus routing metadata and its signature.

use bytes::Bytes;

use crate::crypto::MessageSigner;
use crate::error::Result;
use crate::message::LogMessage;

/// The transmissible unit sent to Loggregator.
///
/// Only the message body is covered by the signature; the routing key,
/// timestamp, and source fields are not authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEnvelope {
    /// Routing key used by Loggregator; always the message's app id.
    pub routing_key: String,

    pub log_message: LogMessage,

    /// `IV || ciphertext` over the message body.
    pub signature: Bytes,
}

impl LogEnvelope {
    /// Sign a message and wrap it for transmission.
    ///
    /// Empty bodies are signed like any other.
    pub fn build(message: LogMessage, signer: &MessageSigner) -> Result<Self> {
        let signature = signer.sign(&message.body)?;

        Ok(Self {
            routing_key: message.app_id.as_str().to_owned(),
            log_message: message,
            signature: Bytes::from(signature),
        })
    }

    /// Get the message.
    pub fn message(&self) -> &LogMessage {
        &self.log_message
    }
}
