//! Raw attendance sessions as reported by the meeting platform.

use serde::{Deserialize, Serialize};

/// One join/leave interval of a device in a meeting.
///
/// A single person may produce several of these by rejoining or by joining
/// from more than one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSession {
    /// Label shown in the meeting (may be empty).
    pub display_name: String,

    /// Secondary/legacy name field (may be empty).
    pub account_name: String,

    /// Email address, empty when the attendee was not signed in.
    pub email: String,

    /// Per-join correlation identifier. Empty string is a valid value.
    pub session_id: String,

    /// Time connected, in seconds.
    pub duration_seconds: u64,
}

impl RawSession {
    /// First non-blank of `display_name` and `account_name`, trimmed.
    pub fn effective_name(&self) -> Option<&str> {
        [self.display_name.as_str(), self.account_name.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|name| !name.is_empty())
    }

    /// Trimmed email, or `None` when blank.
    pub fn email(&self) -> Option<&str> {
        Some(self.email.trim()).filter(|email| !email.is_empty())
    }

    /// Trimmed session identifier.
    pub fn session_id(&self) -> &str {
        self.session_id.trim()
    }

    /// Sessions with neither a name nor an email carry no identity signal.
    pub fn has_identity(&self) -> bool {
        self.effective_name().is_some() || self.email().is_some()
    }
}
