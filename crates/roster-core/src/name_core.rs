//! Heuristic same-person matching for groups that never saw an email.
//!
//! Meeting clients label devices with names like `A_John_Smith_4821` while
//! the person may also join as `John Smith (Guest)`. Stripping the device
//! prefix, the numeric suffix and any parenthetical leaves a shared first
//! word, the *core token*, that both labels agree on.
//!
//! The transformation order matters: moving the parenthetical removal ahead
//! of the separator replacement, for example, changes which names collide.

use std::collections::BTreeMap;

use crate::grouping::{GroupKey, GroupMap};

/// Device prefixes emitted by meeting clients.
const DEVICE_PREFIXES: [&str; 2] = ["A_", "B_"];

/// Length of the numeric suffix appended to device labels.
const DEVICE_SUFFIX_DIGITS: usize = 4;

/// Tokens this short (in characters) are not distinctive enough to match on.
const MIN_TOKEN_CHARS: usize = 3;

/// Extracts the lowercased core token of a display name.
///
/// Returns `None` when nothing distinctive survives, in which case the name
/// must not be used for matching.
pub fn core_token(name: &str) -> Option<String> {
    let name = strip_device_prefix(name);
    let name = strip_device_suffix(name);
    let name = name.replace(['_', '-'], " ");
    let name = remove_parentheticals(&name);

    name.split_whitespace()
        .find(|token| {
            token.chars().count() >= MIN_TOKEN_CHARS && !token.chars().all(|c| c.is_ascii_digit())
        })
        .map(str::to_lowercase)
}

fn strip_device_prefix(name: &str) -> &str {
    DEVICE_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Strips a trailing run of exactly four ASCII digits. Longer runs are part
/// of the name and stay intact.
fn strip_device_suffix(name: &str) -> &str {
    let digits = name.bytes().rev().take_while(u8::is_ascii_digit).count();
    if digits == DEVICE_SUFFIX_DIGITS {
        &name[..name.len() - DEVICE_SUFFIX_DIGITS]
    } else {
        name
    }
}

/// Drops every `(...)` span. An opening parenthesis with no closing one is
/// kept as-is.
fn remove_parentheticals(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;

    while let Some(open) = rest.find('(') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        match after.find(')') {
            Some(close) => rest = &after[close + 1..],
            None => {
                out.push('(');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Merges name-keyed groups that share a core token.
///
/// Email-keyed groups are never touched. Within each core, the group with the
/// smallest key is the base and absorbs the rest. Returns the number of
/// groups merged away.
pub fn core_merge(groups: &mut GroupMap) -> usize {
    let mut by_core: BTreeMap<String, Vec<GroupKey>> = BTreeMap::new();
    for (key, group) in groups.iter().filter(|(key, _)| key.is_name()) {
        let Some(core) = group.names.first().and_then(|name| core_token(name)) else {
            continue;
        };
        by_core.entry(core).or_default().push(key.clone());
    }

    let mut merged = 0;
    for (core, keys) in by_core {
        let Some((base_key, others)) = keys.split_first() else {
            continue;
        };
        if others.is_empty() {
            continue;
        }
        tracing::debug!(%core, base = %base_key, count = others.len(), "merging groups by name core");

        let absorbed: Vec<_> = others.iter().filter_map(|key| groups.remove(key)).collect();
        if let Some(base) = groups.get_mut(base_key) {
            for group in absorbed {
                base.absorb(group);
                merged += 1;
            }
        }
    }

    merged
}
