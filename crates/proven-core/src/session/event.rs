use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{Identity, SessionState};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// The user asked to log out.
    Voluntary,
    /// The idle timer ran out.
    Expired,
    /// Another context logged out, or left unusable data behind.
    External,
}

impl SignOutReason {
    /// Message the presentation layer can show after the transition.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Voluntary => "You have been logged out.",
            Self::Expired => "Your session expired due to inactivity. Please log in again.",
            Self::External => "You were logged out in another window.",
        }
    }
}

/// Session transitions published to the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { identity: Identity },
    SignedOut { reason: SignOutReason },
}

/// Qualifying user-interaction signals that keep a session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySignal {
    PointerDown,
    PointerMove,
    KeyDown,
    Scroll,
    TouchStart,
}

/// Navigation indicator of a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(String);

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The unauthenticated entry point.
    pub fn entry() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_entry(&self) -> bool {
        self.0 == "/"
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::entry()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time view of a lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Only true before the initial check completes.
    pub loading: bool,
    pub route: Route,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Initializing,
            loading: true,
            route: Route::entry(),
        }
    }
}
