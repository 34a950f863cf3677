//! Choosing one display string per attendee.

use std::collections::BTreeSet;

/// Whether a name looks machine-generated (device label) rather than typed.
pub fn is_structured(name: &str) -> bool {
    name.starts_with("A_")
        || name.starts_with("B_")
        || name.chars().any(|c| c == '_' || c.is_ascii_digit())
}

/// Picks the display string for a set of name variants.
///
/// A single variant is used as-is. With several, a structured name is paired
/// with a human one as `"structured (human)"` when both kinds exist, otherwise
/// the first two variants are paired. Returns `None` for an empty set.
pub fn display_name(names: &BTreeSet<String>) -> Option<String> {
    let mut iter = names.iter();
    let first = iter.next()?;
    let Some(second) = iter.next() else {
        return Some(first.clone());
    };

    let structured = names.iter().find(|name| is_structured(name));
    let human = names.iter().find(|name| !is_structured(name));

    Some(match (structured, human) {
        (Some(structured), Some(human)) => format!("{structured} ({human})"),
        _ => format!("{first} ({second})"),
    })
}
