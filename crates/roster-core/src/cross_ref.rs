//! Folding name-only groups into email groups through shared session ids.

use std::collections::{BTreeSet, HashMap};

use crate::grouping::{GroupKey, GroupMap};

/// Merges name-keyed groups into the email-keyed group they share a session
/// identifier with.
///
/// When a name group reaches several email groups, the smallest email key
/// wins. Returns the number of name groups merged away.
pub fn cross_reference_merge(groups: &mut GroupMap) -> usize {
    let plan = merge_plan(groups);

    let merged = plan.len();
    for (source, target) in plan {
        let Some(group) = groups.remove(&source) else {
            continue;
        };
        match groups.get_mut(&target) {
            Some(target) => target.absorb(group),
            // Email groups are never removed here.
            None => {
                groups.insert(source, group);
            }
        }
    }

    merged
}

/// Pairs each linkable name group with the email group it folds into.
fn merge_plan(groups: &GroupMap) -> Vec<(GroupKey, GroupKey)> {
    let index = session_index(groups);

    groups
        .iter()
        .filter(|(key, _)| key.is_name())
        .filter_map(|(key, group)| {
            let targets: BTreeSet<&GroupKey> = group
                .session_ids
                .iter()
                .filter_map(|id| index.get(id.as_str()).copied())
                .collect();
            if targets.len() > 1 {
                tracing::debug!(
                    group = %key,
                    candidates = targets.len(),
                    "name group links to several email groups, using the smallest"
                );
            }
            targets
                .first()
                .map(|target| (key.clone(), (*target).clone()))
        })
        .collect()
}

/// Maps each session id seen on an email group to that group's key.
///
/// If two email groups share a session id, the smaller key keeps it.
fn session_index(groups: &GroupMap) -> HashMap<&str, &GroupKey> {
    let mut index = HashMap::new();
    for (key, group) in groups.iter().filter(|(key, _)| key.is_email()) {
        for id in &group.session_ids {
            index.entry(id.as_str()).or_insert(key);
        }
    }
    index
}
