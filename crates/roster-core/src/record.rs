//! Final attendee rows.

use serde::{Deserialize, Serialize};

use crate::display::display_name;
use crate::grouping::{AttendeeGroup, GroupMap};
use crate::types::{GuestStatus, OrgDomain};

/// One resolved attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRow {
    pub display_name: String,

    /// Empty when no session of this attendee carried an email.
    pub email: String,

    /// Attended time, rounded up to whole minutes.
    pub minutes: u64,

    pub guest: GuestStatus,
}

impl AttendeeRow {
    /// Builds the row for a merged group.
    ///
    /// A group that only ever saw email-only sessions is shown by its email.
    pub fn from_group(group: &AttendeeGroup, domain: &OrgDomain) -> Self {
        let email = group.email.clone().unwrap_or_default();
        let display_name = display_name(&group.names).unwrap_or_else(|| email.clone());
        Self {
            guest: GuestStatus::classify(&email, domain),
            minutes: group.total_seconds.div_ceil(60),
            display_name,
            email,
        }
    }
}

/// Converts merged groups into rows sorted by display name, ignoring case.
///
/// Ties fall back to the exact display name and then the email, so the order
/// never depends on map iteration.
pub fn build_rows(groups: &GroupMap, domain: &OrgDomain) -> Vec<AttendeeRow> {
    let mut rows: Vec<AttendeeRow> = groups
        .values()
        .map(|group| AttendeeRow::from_group(group, domain))
        .collect();
    rows.sort_by_cached_key(|row| {
        (
            row.display_name.to_lowercase(),
            row.display_name.clone(),
            row.email.clone(),
        )
    });
    rows
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::grouping::GroupKey;

    fn domain() -> OrgDomain {
        OrgDomain::new("x.com").unwrap()
    }

    fn group(names: &[&str], email: Option<&str>, secs: u64) -> AttendeeGroup {
        AttendeeGroup {
            names: names.iter().map(ToString::to_string).collect(),
            email: email.map(str::to_string),
            session_ids: BTreeSet::new(),
            total_seconds: secs,
        }
    }

    #[test]
    fn minutes_round_up() {
        let domain = domain();
        assert_eq!(AttendeeRow::from_group(&group(&["A"], None, 0), &domain).minutes, 0);
        assert_eq!(AttendeeRow::from_group(&group(&["A"], None, 1), &domain).minutes, 1);
        assert_eq!(AttendeeRow::from_group(&group(&["A"], None, 60), &domain).minutes, 1);
        assert_eq!(AttendeeRow::from_group(&group(&["A"], None, 61), &domain).minutes, 2);
    }

    #[test]
    fn guest_flag_follows_email_domain() {
        let domain = domain();
        let member = AttendeeRow::from_group(&group(&["A"], Some("a@X.com"), 60), &domain);
        let outsider = AttendeeRow::from_group(&group(&["B"], Some("b@y.org"), 60), &domain);
        let anonymous = AttendeeRow::from_group(&group(&["C"], None, 60), &domain);

        assert_eq!(member.guest, GuestStatus::Member);
        assert_eq!(outsider.guest, GuestStatus::Guest);
        assert_eq!(anonymous.guest, GuestStatus::Guest);
        assert_eq!(anonymous.email, "");
    }

    #[test]
    fn email_only_group_displays_email() {
        let row = AttendeeRow::from_group(&group(&[], Some("quiet@x.com"), 60), &domain());
        assert_eq!(row.display_name, "quiet@x.com");
    }

    #[test]
    fn rows_sorted_case_insensitively_by_display_name() {
        let mut groups = GroupMap::new();
        groups.insert(GroupKey::name("bob"), group(&["Bob"], None, 60));
        groups.insert(GroupKey::email("z@x.com"), group(&["alice"], Some("z@x.com"), 60));
        groups.insert(GroupKey::name("carl"), group(&["Carl"], None, 60));

        let rows = build_rows(&groups, &domain());
        let names: Vec<_> = rows.iter().map(|row| row.display_name.as_str()).collect();
        assert_eq!(names, vec!["alice", "Bob", "Carl"]);
    }
}
