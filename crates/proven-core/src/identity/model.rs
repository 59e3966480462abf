//! Identity and session state domain models.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a user as issued by the credential service.
///
/// The service sends numeric database ids while older payloads carry them as
/// strings; both forms normalize to the same string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An id is only usable when it contains something other than whitespace.
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        crate::serde_util::string_or_number(deserializer).map(Self)
    }
}

/// The authenticated user's public profile subset.
///
/// Issued by the credential service at login and never mutated for the
/// lifetime of a session. Secret material is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    /// Structurally valid identities carry a non-empty id.
    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// First letter of the name, used as an avatar placeholder.
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

/// Authentication state of one execution context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Persisted data has not been checked yet.
    #[default]
    Initializing,
    Anonymous,
    Authenticated(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Short lowercase name used in logs and transition errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Anonymous => "anonymous",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_normalizes_to_string() {
        let identity: Identity =
            serde_json::from_str(r#"{"id": 42, "name": "Ada", "email": "ada@example.com", "role": "user"}"#)
                .unwrap();
        assert_eq!(identity.id.as_str(), "42");
        assert!(identity.is_valid());
    }

    #[test]
    fn test_missing_id_is_invalid() {
        let identity: Identity = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert!(!identity.is_valid());
    }

    #[test]
    fn test_blank_id_is_invalid() {
        let identity = Identity::new("   ", "Ada", "ada@example.com", "user");
        assert!(!identity.is_valid());
    }

    #[test]
    fn test_initial_defaults_to_u() {
        let identity = Identity::new("1", "", "a@b.c", "user");
        assert_eq!(identity.initial(), 'U');
        let identity = Identity::new("1", "grace", "g@b.c", "user");
        assert_eq!(identity.initial(), 'G');
    }

    #[test]
    fn test_state_identity_accessor() {
        let identity = Identity::new("7", "Ada", "ada@example.com", "user");
        let state = SessionState::Authenticated(identity.clone());
        assert_eq!(state.identity(), Some(&identity));
        assert!(SessionState::Anonymous.identity().is_none());
        assert_eq!(SessionState::default(), SessionState::Initializing);
    }
}
