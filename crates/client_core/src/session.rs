//! One operator's enrollment screen: every component behind one lock, plus
//! the network calls that feed them.
//!
//! The lock is never held across a remote call. Each operation mutates
//! state, releases the lock, awaits the server, then re-locks to apply the
//! answer.

use std::sync::Arc;

use chrono::NaiveDate;
use shared::domain::{CommittedReviewer, Conference, ImportableMember, MemberId, Track, TrackId};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

use crate::{
    candidate::{Candidate, CandidateUpdate, ReviewerDetails},
    commit::{CommitCoordinator, CommitOutcome, CommitState},
    error::{EnrollmentError, ErrorCategory, Result},
    existing_reviewers::ExistingReviewersView,
    import_selector::ImportSelector,
    staging::CandidateStagingList,
    track_assignment::TrackAssignmentSet,
    track_catalog::TrackCatalog,
    ConferenceApi, ConferenceContext, EnrollmentEvent,
};

const COMMIT_FAILED_NOTICE: &str =
    "Could not reach the server to save reviewers; the batch is kept, retry when ready.";

#[derive(Default)]
struct SessionState {
    catalog: TrackCatalog,
    staging: CandidateStagingList,
    importer: ImportSelector,
    assignments: TrackAssignmentSet,
    view: ExistingReviewersView,
    commit: CommitCoordinator,
}

impl SessionState {
    fn ensure_not_submitting(&self) -> Result<()> {
        if self.commit.is_submitting() {
            return Err(EnrollmentError::CommitInFlight);
        }
        Ok(())
    }
}

/// Everything a presentation layer needs to render the screen.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub conference: Option<Conference>,
    pub tracks: Vec<Track>,
    pub tracks_loading: bool,
    pub selected_track: Option<TrackId>,
    pub existing_reviewers: Vec<CommittedReviewer>,
    pub reviewers_loading: bool,
    pub staged: Vec<Candidate>,
    pub editing: Option<String>,
    pub importable: Vec<ImportableMember>,
    pub selected_imports: Vec<MemberId>,
    pub assigned_tracks: Vec<TrackId>,
    pub commit_state: CommitState,
    pub success_visible: bool,
}

pub struct EnrollmentSession {
    api: Arc<dyn ConferenceApi>,
    context: ConferenceContext,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<EnrollmentEvent>,
}

impl EnrollmentSession {
    pub fn new(api: Arc<dyn ConferenceApi>, context: ConferenceContext) -> Arc<Self> {
        Self::with_commit_coordinator(api, context, CommitCoordinator::new())
    }

    pub fn with_commit_coordinator(
        api: Arc<dyn ConferenceApi>,
        context: ConferenceContext,
        commit: CommitCoordinator,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            context,
            inner: Mutex::new(SessionState {
                commit,
                ..SessionState::default()
            }),
            events,
        })
    }

    pub fn context(&self) -> &ConferenceContext {
        &self.context
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<EnrollmentEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: EnrollmentEvent) {
        let _ = self.events.send(event);
    }

    fn report(&self, err: &EnrollmentError) {
        match err.category() {
            ErrorCategory::Transport => self.emit(EnrollmentEvent::Error(err.to_string())),
            ErrorCategory::Precondition if err.requires_conference_selection() => {
                self.emit(EnrollmentEvent::ConferenceSelectionRequired)
            }
            _ => {}
        }
    }

    pub async fn load_tracks(&self) -> Result<usize> {
        let conference_id = {
            let mut guard = self.inner.lock().await;
            guard.catalog.begin_load(&self.context)
        }
        .inspect_err(|err| self.report(err))?;

        let fetched = self.api.get_tracks(&conference_id).await;

        let mut guard = self.inner.lock().await;
        let count = guard
            .catalog
            .apply_load(conference_id, fetched)
            .inspect_err(|err| self.report(err))?;
        let conference_name = guard
            .catalog
            .conference()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        drop(guard);

        self.emit(EnrollmentEvent::TracksLoaded {
            conference_name,
            track_count: count,
        });
        Ok(count)
    }

    /// Shows the committed reviewers of `track_id`. Returns `false` when a
    /// later selection overtook this one before its response arrived.
    pub async fn select_track(&self, track_id: TrackId) -> Result<bool> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            if !guard.catalog.contains(&track_id) {
                return Err(EnrollmentError::UnknownTrack(track_id));
            }
            guard.view.begin_refresh(track_id)
        };

        let fetched = self.api.get_reviewers_by_track(ticket.track_id()).await;

        let mut guard = self.inner.lock().await;
        let applied = guard
            .view
            .apply_refresh(&ticket, fetched)
            .inspect_err(|err| self.report(err))?;
        let reviewer_count = guard.view.reviewers().len();
        drop(guard);

        if applied {
            self.emit(EnrollmentEvent::ExistingReviewersRefreshed {
                track_id: ticket.track_id().clone(),
                reviewer_count,
            });
        }
        Ok(applied)
    }

    pub async fn add_candidate(&self, details: ReviewerDetails) -> Result<()> {
        let mut guard = self.inner.lock().await;
        guard.ensure_not_submitting()?;
        guard.staging.add(Candidate::Typed(details))?;
        let staged = guard.staging.len();
        drop(guard);
        self.emit(EnrollmentEvent::StagingChanged { staged });
        Ok(())
    }

    /// Selects a row for editing and returns the details to prefill the form
    /// with. Staged rows win over committed ones, which win over importable
    /// members.
    pub async fn begin_edit(&self, email: &str) -> Result<ReviewerDetails> {
        let mut guard = self.inner.lock().await;
        if let Some(details) = guard.staging.begin_edit(email) {
            return Ok(details);
        }
        let fallback = guard
            .view
            .find(email)
            .map(ReviewerDetails::from)
            .or_else(|| {
                guard
                    .importer
                    .members()
                    .iter()
                    .find(|m| m.email == email)
                    .map(ReviewerDetails::from)
            });
        match fallback {
            Some(details) => Ok(details),
            None => {
                guard.staging.cancel_edit();
                Err(EnrollmentError::NotFound(format!(
                    "no reviewer with email {email}"
                )))
            }
        }
    }

    pub async fn apply_edit(&self, email: &str, update: CandidateUpdate) -> Result<bool> {
        let mut guard = self.inner.lock().await;
        guard.ensure_not_submitting()?;
        let replaced = guard.staging.edit(email, update)?;
        let staged = guard.staging.len();
        drop(guard);
        if replaced {
            self.emit(EnrollmentEvent::StagingChanged { staged });
        } else {
            warn!(email, "session: edited row is not staged, nothing replaced");
            self.emit(EnrollmentEvent::EditNotStaged {
                email: email.to_string(),
            });
        }
        Ok(replaced)
    }

    pub async fn cancel_edit(&self) {
        self.inner.lock().await.staging.cancel_edit();
    }

    pub async fn remove_candidate(&self, email: &str) -> Result<bool> {
        let mut guard = self.inner.lock().await;
        guard.ensure_not_submitting()?;
        let removed = guard.staging.remove(email).is_some();
        let staged = guard.staging.len();
        drop(guard);
        if removed {
            self.emit(EnrollmentEvent::StagingChanged { staged });
        }
        Ok(removed)
    }

    /// Drops the whole staged batch without sending it.
    pub async fn discard_batch(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        guard.ensure_not_submitting()?;
        guard.staging.clear();
        drop(guard);
        self.emit(EnrollmentEvent::StagingChanged { staged: 0 });
        Ok(())
    }

    pub async fn load_importable(&self, cutoff: Option<NaiveDate>) -> Result<usize> {
        let conference_id = self
            .context
            .require()
            .inspect_err(|err| self.report(err))?
            .clone();

        let fetched = self.api.get_importable_members(&conference_id, cutoff).await;

        let member_count = self
            .inner
            .lock()
            .await
            .importer
            .apply_load(cutoff, fetched)
            .inspect_err(|err| self.report(err))?;
        self.emit(EnrollmentEvent::ImportableMembersLoaded { member_count });
        Ok(member_count)
    }

    pub async fn toggle_import(&self, member_id: &MemberId) -> Result<bool> {
        let selected = self.inner.lock().await.importer.toggle_select(member_id)?;
        self.emit(EnrollmentEvent::ImportSelectionChanged {
            member_id: member_id.clone(),
            selected,
        });
        Ok(selected)
    }

    /// Moves the selected importable members into staging, all or nothing.
    /// The selection is cleared in every case.
    pub async fn import_selected(&self) -> Result<usize> {
        let mut guard = self.inner.lock().await;
        if let Err(err) = guard.ensure_not_submitting() {
            guard.importer.clear_selection();
            return Err(err);
        }
        let SessionState {
            importer, staging, ..
        } = &mut *guard;
        let result = importer.commit_selection(staging);
        let staged = guard.staging.len();
        drop(guard);

        match result {
            Ok(added) => {
                info!(added, staged, "session: imported previous members");
                self.emit(EnrollmentEvent::StagingChanged { staged });
                Ok(added)
            }
            Err(err) => {
                self.emit(EnrollmentEvent::ImportRejected {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    pub async fn toggle_assignment(&self, track_id: &TrackId) -> Result<bool> {
        let mut guard = self.inner.lock().await;
        if !guard.catalog.contains(track_id) {
            return Err(EnrollmentError::UnknownTrack(track_id.clone()));
        }
        Ok(guard.assignments.toggle(track_id))
    }

    /// Sends the staged batch. On success the success flag is raised and a
    /// timer lowers it after the coordinator's success window.
    pub async fn commit(self: &Arc<Self>) -> Result<CommitOutcome> {
        let prepared = {
            let mut guard = self.inner.lock().await;
            let SessionState {
                staging,
                assignments,
                view,
                commit,
                ..
            } = &mut *guard;
            let primary = view.track_id().cloned();
            commit.begin(staging, assignments, primary.as_ref())?
        };

        let response = self
            .api
            .create_reviewers(&prepared.request, &prepared.primary_track)
            .await;

        let (result, window) = {
            let mut guard = self.inner.lock().await;
            let SessionState {
                staging,
                view,
                commit,
                ..
            } = &mut *guard;
            (
                commit.complete(&prepared, response, staging, view),
                commit.success_window(),
            )
        };

        match &result {
            Ok(outcome) => {
                self.emit(EnrollmentEvent::CommitSucceeded {
                    committed: outcome.committed.len(),
                });
                self.emit(EnrollmentEvent::StagingChanged { staged: 0 });
                self.schedule_success_clear(window);
            }
            Err(EnrollmentError::ValidationRejected(message)) => {
                self.emit(EnrollmentEvent::CommitRejected {
                    message: message.clone(),
                });
            }
            Err(err) => {
                error!(error = %err, "session: commit failed, batch kept for retry");
                self.emit(EnrollmentEvent::Error(COMMIT_FAILED_NOTICE.to_string()));
            }
        }
        result
    }

    fn schedule_success_clear(self: &Arc<Self>, window: std::time::Duration) {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let expired = session
                .inner
                .lock()
                .await
                .commit
                .expire_success(tokio::time::Instant::now());
            if expired {
                session.emit(EnrollmentEvent::CommitSuccessCleared);
            }
        });
    }

    /// Dismisses a failed commit's alert.
    pub async fn acknowledge_failure(&self) {
        self.inner.lock().await.commit.acknowledge();
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        let importable = guard.importer.members().to_vec();
        let selected_imports = importable
            .iter()
            .filter(|m| guard.importer.is_selected(&m.id))
            .map(|m| m.id.clone())
            .collect();
        SessionSnapshot {
            conference: guard.catalog.conference().cloned(),
            tracks: guard.catalog.tracks().to_vec(),
            tracks_loading: guard.catalog.is_loading(),
            selected_track: guard.view.track_id().cloned(),
            existing_reviewers: guard.view.reviewers().to_vec(),
            reviewers_loading: guard.view.is_loading(),
            staged: guard.staging.candidates().to_vec(),
            editing: guard.staging.editing().map(str::to_string),
            importable,
            selected_imports,
            assigned_tracks: guard.assignments.snapshot(),
            commit_state: guard.commit.state().clone(),
            success_visible: guard.commit.success_visible(),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
