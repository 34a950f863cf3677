//! The full resolution pipeline.

use crate::cross_ref::cross_reference_merge;
use crate::grouping::{GroupMap, group_sessions};
use crate::name_core::core_merge;
use crate::record::{AttendeeRow, build_rows};
use crate::session::RawSession;
use crate::types::OrgDomain;

/// Counters describing one resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Sessions received.
    pub sessions: usize,
    /// Sessions skipped for lacking both name and email.
    pub dropped: usize,
    /// Name groups folded into email groups via shared session ids.
    pub cross_reference_merges: usize,
    /// Name groups folded together via a shared core token.
    pub core_merges: usize,
    /// Groups left after merging.
    pub attendees: usize,
}

/// Groups and merges sessions, returning the final attendee groups.
pub fn resolve_groups(sessions: &[RawSession]) -> GroupMap {
    resolve_groups_with_stats(sessions).0
}

/// Like [`resolve_groups`], also reporting what each stage did.
pub fn resolve_groups_with_stats(sessions: &[RawSession]) -> (GroupMap, ResolutionStats) {
    let dropped = sessions.iter().filter(|s| !s.has_identity()).count();
    let mut groups = group_sessions(sessions);
    let cross_reference_merges = cross_reference_merge(&mut groups);
    let core_merges = core_merge(&mut groups);

    let stats = ResolutionStats {
        sessions: sessions.len(),
        dropped,
        cross_reference_merges,
        core_merges,
        attendees: groups.len(),
    };
    tracing::debug!(?stats, "resolved attendee groups");
    (groups, stats)
}

/// Resolves raw sessions into one sorted row per attendee.
pub fn resolve_attendees(sessions: &[RawSession], domain: &OrgDomain) -> Vec<AttendeeRow> {
    build_rows(&resolve_groups(sessions), domain)
}
