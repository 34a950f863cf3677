//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// The organization's email domain fragment.
///
/// Attendees whose email does not contain this fragment (case-insensitively)
/// are reported as guests. The fragment is stored lowercased, so values like
/// `"@Example.com"` and `"example.com"` both work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrgDomain(String);

impl OrgDomain {
    /// Creates a new domain fragment after validation.
    pub fn new(domain: impl AsRef<str>) -> Result<Self, ValidationError> {
        let domain = domain.as_ref().trim();
        if domain.is_empty() {
            return Err(ValidationError::Empty {
                field: "organization domain",
            });
        }
        Ok(Self(domain.to_lowercase()))
    }

    /// Returns the normalized fragment.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `email` belongs to this organization.
    ///
    /// Blank emails never match.
    pub fn matches(&self, email: &str) -> bool {
        let email = email.trim();
        !email.is_empty() && email.to_lowercase().contains(&self.0)
    }
}

impl TryFrom<String> for OrgDomain {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrgDomain> for String {
    fn from(domain: OrgDomain) -> Self {
        domain.0
    }
}

impl fmt::Display for OrgDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an attendee belongs to the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestStatus {
    /// No email, or an email outside the organization domain.
    Guest,
    /// Email within the organization domain.
    Member,
}

impl GuestStatus {
    /// Classifies an attendee email against the organization domain.
    pub fn classify(email: &str, domain: &OrgDomain) -> Self {
        if domain.matches(email) {
            Self::Member
        } else {
            Self::Guest
        }
    }

    /// Label used in the "Guest" report column.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Guest => "Yes",
            Self::Member => "No",
        }
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_domain_rejects_blank() {
        assert!(OrgDomain::new("").is_err());
        assert!(OrgDomain::new("   ").is_err());
        assert!(OrgDomain::new("example.com").is_ok());
    }

    #[test]
    fn org_domain_is_lowercased_and_trimmed() {
        let domain = OrgDomain::new("  @Example.COM ").unwrap();
        assert_eq!(domain.as_str(), "@example.com");
    }

    #[test]
    fn org_domain_matches_case_insensitively() {
        let domain = OrgDomain::new("@example.com").unwrap();
        assert!(domain.matches("Jane.Doe@EXAMPLE.com"));
        assert!(!domain.matches("jane@other.org"));
        assert!(!domain.matches(""));
        assert!(!domain.matches("   "));
    }

    #[test]
    fn org_domain_matches_substring_anywhere() {
        // Substring check, so subdomains of the fragment still match.
        let domain = OrgDomain::new("example.com").unwrap();
        assert!(domain.matches("ops@mail.example.com"));
    }

    #[test]
    fn org_domain_serde_rejects_empty() {
        let result: Result<OrgDomain, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
        let parsed: OrgDomain = serde_json::from_str("\"X.com\"").unwrap();
        assert_eq!(parsed.as_str(), "x.com");
    }

    #[test]
    fn guest_status_classify() {
        let domain = OrgDomain::new("x.com").unwrap();
        assert_eq!(GuestStatus::classify("a@x.com", &domain), GuestStatus::Member);
        assert_eq!(GuestStatus::classify("a@y.org", &domain), GuestStatus::Guest);
        assert_eq!(GuestStatus::classify("", &domain), GuestStatus::Guest);
    }

    #[test]
    fn guest_status_labels() {
        assert_eq!(GuestStatus::Guest.as_label(), "Yes");
        assert_eq!(GuestStatus::Member.as_label(), "No");
        assert_eq!(GuestStatus::Guest.to_string(), "Yes");
    }
}
