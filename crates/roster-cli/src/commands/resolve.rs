//! Resolve command: offline report from a saved participants payload.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use roster_api::{ParticipantsPage, ZoomParticipant};
use roster_core::{RawSession, resolve_attendees};

use crate::Config;
use crate::csv;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Participants JSON: a bare array or a saved Zoom page object.
    pub input: PathBuf,

    /// Organization email domain (overrides config).
    #[arg(long)]
    pub org_domain: Option<String>,

    /// Write the CSV here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParticipantsInput {
    List(Vec<ZoomParticipant>),
    Page(ParticipantsPage),
}

/// Runs the resolve command, returning the number of attendee rows.
pub fn run<W: Write>(writer: &mut W, args: &ResolveArgs, config: &Config) -> Result<usize> {
    let domain = config.org_domain(args.org_domain.as_deref())?;
    let sessions = load_sessions(&args.input)?;
    let rows = resolve_attendees(&sessions, &domain);
    tracing::info!(
        sessions = sessions.len(),
        attendees = rows.len(),
        "resolved attendees"
    );

    match &args.output {
        Some(path) => {
            fs::write(path, csv::to_bytes(&rows))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => csv::write_rows(writer, &rows).context("failed to write CSV")?,
    }
    Ok(rows.len())
}

fn load_sessions(path: &Path) -> Result<Vec<RawSession>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_sessions(&contents).with_context(|| format!("invalid participants in {}", path.display()))
}

fn parse_sessions(contents: &str) -> Result<Vec<RawSession>> {
    let participants = match serde_json::from_str::<ParticipantsInput>(contents)? {
        ParticipantsInput::List(list) => list,
        ParticipantsInput::Page(page) => page.participants,
    };
    Ok(participants.into_iter().map(RawSession::from).collect())
}
