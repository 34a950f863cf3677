//! CLI subcommand implementations.

pub mod authorize;
pub mod report;
pub mod resolve;
