use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client_core::{
    ConferenceContext, EnrollmentEvent, EnrollmentSession, HttpConferenceApi,
};
use shared::domain::{ConferenceId, MemberId, TrackId};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod batch;
mod config;

#[derive(Parser, Debug)]
#[command(about = "Enroll reviewers into conference tracks")]
struct Args {
    /// Config file; defaults to ./console.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[arg(long, global = true)]
    conference_id: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tracks of the active conference.
    Tracks,
    /// Show reviewers already committed to a track.
    Reviewers {
        #[arg(long)]
        track: String,
    },
    /// List members of earlier conferences that can be imported.
    Importable {
        #[arg(long)]
        before: Option<NaiveDate>,
    },
    /// Stage a batch and commit it to the assigned tracks.
    Enroll {
        /// Track whose reviewer list the batch is posted to.
        #[arg(long)]
        track: String,
        #[arg(long = "assign", required = true)]
        assign: Vec<String>,
        #[arg(long)]
        batch: Option<PathBuf>,
        #[arg(long = "import")]
        import: Vec<String>,
        #[arg(long)]
        before: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(v) = args.server_url.clone() {
        settings.server_url = v;
    }
    if let Some(v) = args.conference_id.clone() {
        settings.conference_id = Some(v);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let server_url = config::normalize_server_url(&settings.server_url)?;
    let api = HttpConferenceApi::with_timeout(&server_url, settings.request_timeout())?;
    let context = ConferenceContext::new(settings.conference_id.clone().map(ConferenceId::new));
    info!(%server_url, conference = ?context.conference_id(), "console: starting");

    let session = EnrollmentSession::new(Arc::new(api), context);
    let mut events = session.subscribe_events();

    let outcome = run(&session, args.command, &mut events).await;
    print_events(&mut events);
    outcome
}

async fn run(
    session: &Arc<EnrollmentSession>,
    command: Command,
    events: &mut broadcast::Receiver<EnrollmentEvent>,
) -> Result<()> {
    match command {
        Command::Tracks => {
            session.load_tracks().await?;
            let snapshot = session.snapshot().await;
            if let Some(conference) = &snapshot.conference {
                println!("{} ({})", conference.name, conference.id);
            }
            for track in &snapshot.tracks {
                println!("  {}\t{}", track.id, track.name);
            }
        }
        Command::Reviewers { track } => {
            session.load_tracks().await?;
            session.select_track(TrackId::new(track)).await?;
            for reviewer in session.snapshot().await.existing_reviewers {
                println!("  {}\t{}", reviewer.email, reviewer.name);
            }
        }
        Command::Importable { before } => {
            session.load_importable(before).await?;
            for member in session.snapshot().await.importable {
                println!(
                    "  {}\t{}\t{}\t{}",
                    member.id,
                    member.email,
                    member.name,
                    member.affiliation.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Enroll {
            track,
            assign,
            batch,
            import,
            before,
        } => {
            session.load_tracks().await?;
            session.select_track(TrackId::new(track)).await?;
            for id in assign {
                session.toggle_assignment(&TrackId::new(id)).await?;
            }

            if let Some(path) = batch {
                for details in batch::load_batch(&path)? {
                    let email = details.email.clone();
                    session
                        .add_candidate(details)
                        .await
                        .with_context(|| format!("could not stage '{email}'"))?;
                }
            }

            if !import.is_empty() {
                session.load_importable(before).await?;
                for id in import {
                    session.toggle_import(&MemberId::new(id)).await?;
                }
                session.import_selected().await?;
            }
            print_events(events);

            let outcome = match session.commit().await {
                Ok(outcome) => outcome,
                Err(err) => {
                    print_events(events);
                    bail!("commit failed: {err}");
                }
            };
            println!(
                "committed {} reviewer(s), {} new on this track",
                outcome.committed.len(),
                outcome.appended
            );
        }
    }
    Ok(())
}

fn print_events(events: &mut broadcast::Receiver<EnrollmentEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => println!("{}", describe(&event)),
            Err(TryRecvError::Lagged(skipped)) => println!("... {skipped} event(s) skipped"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

fn describe(event: &EnrollmentEvent) -> String {
    match event {
        EnrollmentEvent::ConferenceSelectionRequired => {
            "no conference selected: pass --conference-id or set CONFERENCE_ID".into()
        }
        EnrollmentEvent::TracksLoaded {
            conference_name,
            track_count,
        } => format!("loaded {track_count} track(s) for {conference_name}"),
        EnrollmentEvent::ExistingReviewersRefreshed {
            track_id,
            reviewer_count,
        } => format!("{track_id}: {reviewer_count} committed reviewer(s)"),
        EnrollmentEvent::StagingChanged { staged } => format!("{staged} candidate(s) staged"),
        EnrollmentEvent::ImportableMembersLoaded { member_count } => {
            format!("{member_count} importable member(s)")
        }
        EnrollmentEvent::ImportRejected { message } => format!("import rejected: {message}"),
        EnrollmentEvent::EditNotStaged { email } => {
            format!("{email} is not in the batch; edit discarded")
        }
        EnrollmentEvent::ImportSelectionChanged {
            member_id,
            selected,
        } => format!(
            "{member_id} {}",
            if *selected { "selected" } else { "deselected" }
        ),
        EnrollmentEvent::CommitSucceeded { committed } => {
            format!("batch accepted ({committed} reviewer(s))")
        }
        EnrollmentEvent::CommitSuccessCleared => "ready".into(),
        EnrollmentEvent::CommitRejected { message } => format!("batch rejected: {message}"),
        EnrollmentEvent::Error(message) => format!("error: {message}"),
    }
}
