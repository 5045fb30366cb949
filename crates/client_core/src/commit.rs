//! Batch commit state machine.
//!
//! `Idle -> Submitting -> {Succeeded, Failed} -> Idle`. A success stays
//! visible for [`SUCCESS_WINDOW`] and then falls back to `Idle`; a failure
//! stays until acknowledged or until the next attempt.

use std::time::Duration;

use shared::{
    domain::{CommittedReviewer, TrackId},
    error::{ApiException, ErrorCode},
    protocol::{CreateReviewersRequest, CreateReviewersResponse},
};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{
    error::{EnrollmentError, Result},
    existing_reviewers::ExistingReviewersView,
    staging::CandidateStagingList,
    track_assignment::TrackAssignmentSet,
};

pub const SUCCESS_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitState {
    Idle,
    Submitting,
    Succeeded { committed: usize },
    Failed(EnrollmentError),
}

/// Request built from staging at the moment the commit started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommit {
    pub primary_track: TrackId,
    pub request: CreateReviewersRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub committed: Vec<CommittedReviewer>,
    pub appended: usize,
}

#[derive(Debug)]
pub struct CommitCoordinator {
    state: CommitState,
    success_until: Option<Instant>,
    success_window: Duration,
}

impl Default for CommitCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitCoordinator {
    pub fn new() -> Self {
        Self::with_success_window(SUCCESS_WINDOW)
    }

    pub fn with_success_window(success_window: Duration) -> Self {
        Self {
            state: CommitState::Idle,
            success_until: None,
            success_window,
        }
    }

    pub fn state(&self) -> &CommitState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == CommitState::Submitting
    }

    pub fn success_visible(&self) -> bool {
        matches!(self.state, CommitState::Succeeded { .. })
    }

    pub fn success_window(&self) -> Duration {
        self.success_window
    }

    /// Validates the batch and moves to `Submitting`.
    pub fn begin(
        &mut self,
        staging: &CandidateStagingList,
        assignments: &TrackAssignmentSet,
        primary_track: Option<&TrackId>,
    ) -> Result<PreparedCommit> {
        if self.is_submitting() {
            return Err(EnrollmentError::CommitInFlight);
        }
        let primary_track = primary_track.ok_or(EnrollmentError::NoTrackSelected)?;
        if assignments.is_empty() {
            return Err(EnrollmentError::NoTracksAssigned);
        }
        if staging.is_empty() {
            return Err(EnrollmentError::EmptyBatch);
        }

        let tracks = assignments.snapshot();
        let request = CreateReviewersRequest {
            reviewers: staging
                .candidates()
                .iter()
                .map(|c| c.to_new_reviewer(&tracks))
                .collect(),
        };

        self.state = CommitState::Submitting;
        self.success_until = None;
        info!(
            primary_track = %primary_track,
            reviewers = request.reviewers.len(),
            tracks = tracks.len(),
            "commit: submitting batch"
        );
        Ok(PreparedCommit {
            primary_track: primary_track.clone(),
            request,
        })
    }

    /// Applies the server's answer to a submitted batch.
    ///
    /// On success staging is cleared and, if the view still shows the track
    /// the batch was posted to, it absorbs exactly what the server echoed.
    /// A view that moved to another track is left to its own refresh. On
    /// failure staging is left as it was.
    pub fn complete(
        &mut self,
        prepared: &PreparedCommit,
        response: std::result::Result<CreateReviewersResponse, ApiException>,
        staging: &mut CandidateStagingList,
        view: &mut ExistingReviewersView,
    ) -> Result<CommitOutcome> {
        match response {
            Ok(response) => {
                staging.clear();
                let appended = if view.track_id() == Some(&prepared.primary_track) {
                    view.absorb(&response.reviewers)
                } else {
                    debug!(
                        primary_track = %prepared.primary_track,
                        shown = ?view.track_id(),
                        "commit: view moved to another track, skipping absorb"
                    );
                    0
                };
                self.state = CommitState::Succeeded {
                    committed: response.reviewers.len(),
                };
                self.success_until = Some(Instant::now() + self.success_window);
                info!(
                    committed = response.reviewers.len(),
                    appended, "commit: batch accepted"
                );
                Ok(CommitOutcome {
                    committed: response.reviewers,
                    appended,
                })
            }
            Err(err) => {
                let failure = if err.code == ErrorCode::Validation {
                    warn!(message = %err.message, "commit: batch rejected by server");
                    EnrollmentError::ValidationRejected(err.message)
                } else {
                    error!(error = %err, staged = staging.len(), "commit: transport failure");
                    EnrollmentError::TransportFailure(err.to_string())
                };
                self.state = CommitState::Failed(failure.clone());
                Err(failure)
            }
        }
    }

    /// `Failed -> Idle`.
    pub fn acknowledge(&mut self) {
        if matches!(self.state, CommitState::Failed(_)) {
            self.state = CommitState::Idle;
        }
    }

    /// `Succeeded -> Idle` once the success window has passed. Returns whether
    /// the transition happened.
    pub fn expire_success(&mut self, now: Instant) -> bool {
        match self.success_until {
            Some(deadline) if now >= deadline && self.success_visible() => {
                self.state = CommitState::Idle;
                self.success_until = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/commit_tests.rs"]
mod tests;
