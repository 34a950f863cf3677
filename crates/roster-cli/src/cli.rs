//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::report::ReportArgs;
use crate::commands::resolve::ResolveArgs;

/// Meeting attendance reports.
///
/// Collapses per-session participant records into one row per attendee with
/// total minutes and a guest flag.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the attendance report for a day's busiest meeting.
    Report(ReportArgs),

    /// Resolve attendees from a saved participants JSON file.
    Resolve(ResolveArgs),

    /// Authorize Drive uploads and store the Google token.
    Authorize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_with_date() {
        let cli = Cli::try_parse_from(["roster", "report", "--date", "2025-10-28", "--no-upload"])
            .unwrap();
        let Some(Commands::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.date.unwrap().to_string(), "2025-10-28");
        assert!(args.no_upload);
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(Cli::try_parse_from(["roster", "report", "--date", "28/10/2025"]).is_err());
    }

    #[test]
    fn parses_resolve_with_global_flags() {
        let cli = Cli::try_parse_from([
            "roster",
            "resolve",
            "participants.json",
            "--org-domain",
            "x.com",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Some(Commands::Resolve(args)) = cli.command else {
            panic!("expected resolve command");
        };
        assert_eq!(args.input, PathBuf::from("participants.json"));
        assert_eq!(args.org_domain.as_deref(), Some("x.com"));
        assert!(args.output.is_none());
    }
}
