//! Attendee identity resolution for meeting participant reports.
//!
//! Meeting platforms report one record per join/leave event, so a single
//! person can show up several times under different labels. This crate
//! collapses those records into one row per person:
//! - Grouping: bucket sessions by email, or by name when no email is known
//! - Cross-reference: fold name-only groups into email groups via shared session ids
//! - Name core: merge remaining name-only groups whose labels share a core word
//! - Rows: pick a display name, round minutes up and flag guests

mod cross_ref;
pub mod display;
pub mod grouping;
pub mod name_core;
mod record;
mod resolve;
pub mod session;
pub mod types;

pub use cross_ref::cross_reference_merge;
pub use grouping::{AttendeeGroup, GroupKey, GroupMap, group_sessions};
pub use name_core::{core_merge, core_token};
pub use record::{AttendeeRow, build_rows};
pub use resolve::{ResolutionStats, resolve_attendees, resolve_groups, resolve_groups_with_stats};
pub use session::RawSession;
pub use types::{GuestStatus, OrgDomain, ValidationError};
