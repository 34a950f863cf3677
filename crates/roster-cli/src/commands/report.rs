//! Report command: the daily attendance job.
//!
//! Looks up the admin user's meetings for the day, picks the one with the
//! most participants, resolves its attendees and uploads the CSV to Drive
//! (or writes it locally with `--no-upload`).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::Args;

use roster_api::{
    AuthorizedUser, DriveClient, GoogleAuth, MeetingSummary, ZoomClient, busiest_meeting,
};
use roster_core::{OrgDomain, RawSession, resolve_attendees};

use crate::Config;
use crate::csv;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Day whose meetings are reported (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Write the CSV to the output directory instead of uploading it.
    #[arg(long)]
    pub no_upload: bool,
}

/// Where a finished report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Drive { file_id: String },
    Local { path: PathBuf },
}

/// Summary of a generated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub filename: String,
    pub attendees: usize,
    pub destination: Destination,
}

/// Runs the report command.
///
/// Returns `None` when no meeting took place on the requested day.
pub fn run<W: Write>(
    writer: &mut W,
    args: &ReportArgs,
    config: &Config,
) -> Result<Option<ReportOutcome>> {
    let day = args.date.unwrap_or_else(|| Local::now().date_naive());
    let domain = config.org_domain(None)?;
    let credentials = config.zoom_credentials()?;
    let admin = config.zoom_admin_email()?;
    let folder_id = if args.no_upload {
        None
    } else {
        Some(config.drive_folder_id()?)
    };

    tracing::info!(%day, "processing meetings");
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let outcome = runtime.block_on(async {
        let zoom = ZoomClient::connect(&credentials)
            .await
            .context("failed to authenticate with Zoom")?;
        let meetings = zoom
            .list_meetings(&admin, day)
            .await
            .with_context(|| format!("failed to list meetings for {admin} on {day}"))?;
        let Some(meeting) = busiest_meeting(&meetings) else {
            return Ok(None);
        };
        tracing::info!(
            meeting_id = meeting.id,
            topic = %meeting.topic,
            participants = meeting.participants_count,
            "selected meeting"
        );

        let participants = zoom
            .list_participants(&meeting.uuid)
            .await
            .with_context(|| format!("failed to list participants of meeting {}", meeting.id))?;
        let sessions: Vec<RawSession> = participants.into_iter().map(RawSession::from).collect();
        let report = build_report(meeting, day, &sessions, &domain);

        let destination = match &folder_id {
            Some(folder_id) => upload(config, folder_id, &report).await?,
            None => write_local(config, &report)?,
        };
        Ok::<_, anyhow::Error>(Some(ReportOutcome {
            filename: report.filename,
            attendees: report.attendees,
            destination,
        }))
    })?;

    match &outcome {
        None => {
            tracing::info!(%day, "no meetings found");
            writeln!(writer, "No meetings on {day}.")?;
        }
        Some(outcome) => match &outcome.destination {
            Destination::Drive { file_id } => writeln!(
                writer,
                "Uploaded {} ({} attendees) as Drive file {file_id}",
                outcome.filename, outcome.attendees
            )?,
            Destination::Local { path } => writeln!(
                writer,
                "Wrote {} ({} attendees)",
                path.display(),
                outcome.attendees
            )?,
        },
    }

    Ok(outcome)
}

/// A resolved report ready to store.
#[derive(Debug)]
struct Report {
    filename: String,
    attendees: usize,
    contents: Vec<u8>,
}

fn build_report(
    meeting: &MeetingSummary,
    day: NaiveDate,
    sessions: &[RawSession],
    domain: &OrgDomain,
) -> Report {
    let rows = resolve_attendees(sessions, domain);
    Report {
        filename: report_filename(meeting.id, day),
        attendees: rows.len(),
        contents: csv::to_bytes(&rows),
    }
}

/// `participants_{meeting id}_{previous day as YYYY_MM_DD}.csv`.
///
/// The job runs after midnight, so the file is labelled with the day the
/// meeting actually happened.
pub fn report_filename(meeting_id: u64, day: NaiveDate) -> String {
    let label_day = day.checked_sub_days(Days::new(1)).unwrap_or(day);
    format!(
        "participants_{meeting_id}_{}.csv",
        label_day.format("%Y_%m_%d")
    )
}

async fn upload(config: &Config, folder_id: &str, report: &Report) -> Result<Destination> {
    let token_path = &config.google.token_path;
    let mut user = AuthorizedUser::load(token_path).with_context(|| {
        format!(
            "failed to load Google token from {} (run `roster authorize` first)",
            token_path.display()
        )
    })?;

    let auth = GoogleAuth::new()?;
    if auth
        .ensure_fresh(&mut user)
        .await
        .context("failed to refresh Google token")?
    {
        user.save(token_path)
            .with_context(|| format!("failed to save {}", token_path.display()))?;
    }
    let access_token = user
        .access_token()
        .context("Google token file has no access token")?;

    let drive = DriveClient::new(access_token)?;
    let file_id = drive
        .upload_csv(folder_id, &report.filename, &report.contents)
        .await
        .with_context(|| format!("failed to upload {}", report.filename))?;
    Ok(Destination::Drive { file_id })
}

fn write_local(config: &Config, report: &Report) -> Result<Destination> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    let path = config.output_dir.join(&report.filename);
    fs::write(&path, &report.contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Destination::Local { path })
}
