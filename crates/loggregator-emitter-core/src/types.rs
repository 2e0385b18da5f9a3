//! Strong type definitions for the emitter core.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The identifier of the application a log line belongs to.
///
/// Loggregator routes on the string form of the application GUID. A
/// [`Uuid`] is normalized to its lowercase hyphenated representation, so
/// emitting with a `Uuid` and with its string form yields identical
/// envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId(String);

impl AppId {
    /// Create from any string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the canonical string form.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AppId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for AppId {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<Uuid> for AppId {
    fn from(id: Uuid) -> Self {
        Self(id.hyphenated().to_string())
    }
}

impl From<&Uuid> for AppId {
    fn from(id: &Uuid) -> Self {
        Self::from(*id)
    }
}
