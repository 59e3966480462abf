//! Encoding of the identity held under the session key.

use crate::error::Result;
use crate::identity::Identity;

/// Outcome of decoding the raw value found under the session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistedSession {
    /// Nothing is stored.
    Absent,
    /// A structurally valid identity.
    Valid(Identity),
    /// Something is stored but it cannot be used; the caller clears it.
    Malformed(String),
}

impl PersistedSession {
    /// Decodes an optional raw payload.
    ///
    /// A payload that parses but lacks a non-empty id is malformed, the same
    /// as one that does not parse at all.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Absent;
        };

        match serde_json::from_str::<Identity>(raw) {
            Ok(identity) if identity.is_valid() => Self::Valid(identity),
            Ok(_) => Self::Malformed("identity has no id".to_string()),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }

    pub fn encode(identity: &Identity) -> Result<String> {
        Ok(serde_json::to_string(identity)?)
    }
}
