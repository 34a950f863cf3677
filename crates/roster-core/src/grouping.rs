//! Provisional grouping of sessions by email or name.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::session::RawSession;

/// Identity a group is keyed by.
///
/// Both variants hold the trimmed, lowercased form of the source string.
/// `Ord` is derived so group maps iterate deterministically, with every
/// email key ordered before every name key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Email(String),
    Name(String),
}

impl GroupKey {
    /// Key for a normalized email.
    pub fn email(email: &str) -> Self {
        Self::Email(normalize(email))
    }

    /// Key for a normalized name.
    pub fn name(name: &str) -> Self {
        Self::Name(normalize(name))
    }

    #[must_use]
    pub const fn is_email(&self) -> bool {
        matches!(self, Self::Email(_))
    }

    #[must_use]
    pub const fn is_name(&self) -> bool {
        matches!(self, Self::Name(_))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(email) => write!(f, "email:{email}"),
            Self::Name(name) => write!(f, "name:{name}"),
        }
    }
}

/// Sessions attributed to one provisional attendee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeGroup {
    /// Original (trimmed) name variants seen for this attendee.
    pub names: BTreeSet<String>,

    /// First non-empty email observed. Never overwritten once set.
    pub email: Option<String>,

    /// Session identifiers that contributed to this group.
    pub session_ids: BTreeSet<String>,

    /// Sum of contributing session durations, saturating at `u64::MAX`.
    pub total_seconds: u64,
}

impl AttendeeGroup {
    /// Folds a single session into the group.
    pub fn add_session(&mut self, session: &RawSession) {
        if let Some(name) = session.effective_name() {
            self.names.insert(name.to_string());
        }
        self.session_ids.insert(session.session_id().to_string());
        self.total_seconds = self.total_seconds.saturating_add(session.duration_seconds);
        if self.email.is_none() {
            self.email = session.email().map(str::to_string);
        }
    }

    /// Moves everything from `other` into this group.
    ///
    /// The receiving group's email is kept if already set.
    pub fn absorb(&mut self, other: Self) {
        self.names.extend(other.names);
        self.session_ids.extend(other.session_ids);
        self.total_seconds = self.total_seconds.saturating_add(other.total_seconds);
        if self.email.is_none() {
            self.email = other.email;
        }
    }
}

/// Live groups keyed by identity.
pub type GroupMap = BTreeMap<GroupKey, AttendeeGroup>;

/// Trim and lowercase.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Buckets sessions by normalized email, falling back to normalized name.
///
/// Sessions without a name or an email are skipped.
pub fn group_sessions(sessions: &[RawSession]) -> GroupMap {
    let mut groups = GroupMap::new();

    for session in sessions {
        let key = match (session.email(), session.effective_name()) {
            (Some(email), _) => GroupKey::email(email),
            (None, Some(name)) => GroupKey::name(name),
            (None, None) => continue,
        };
        groups.entry(key).or_default().add_session(session);
    }

    groups
}
