use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::{CommittedReviewer, ConferenceId, ImportableMember, MemberId, TrackId},
    error::ApiException,
    protocol::{CreateReviewersRequest, CreateReviewersResponse, TracksResponse},
};

pub mod candidate;
pub mod commit;
pub mod error;
pub mod existing_reviewers;
pub mod http;
pub mod import_selector;
mod session;
pub mod staging;
pub mod track_assignment;
pub mod track_catalog;

pub use candidate::{Candidate, CandidateUpdate, ReviewerDetails};
pub use commit::{CommitCoordinator, CommitOutcome, CommitState, SUCCESS_WINDOW};
pub use error::{EnrollmentError, ErrorCategory};
pub use existing_reviewers::ExistingReviewersView;
pub use http::HttpConferenceApi;
pub use import_selector::ImportSelector;
pub use session::{EnrollmentSession, SessionSnapshot};
pub use staging::CandidateStagingList;
pub use track_assignment::TrackAssignmentSet;
pub use track_catalog::TrackCatalog;

/// Remote operations the enrollment workflow depends on.
#[async_trait]
pub trait ConferenceApi: Send + Sync {
    async fn get_tracks(&self, conference_id: &ConferenceId)
        -> Result<TracksResponse, ApiException>;
    async fn get_reviewers_by_track(
        &self,
        track_id: &TrackId,
    ) -> Result<Vec<CommittedReviewer>, ApiException>;
    async fn get_importable_members(
        &self,
        conference_id: &ConferenceId,
        before: Option<NaiveDate>,
    ) -> Result<Vec<ImportableMember>, ApiException>;
    async fn create_reviewers(
        &self,
        request: &CreateReviewersRequest,
        primary_track: &TrackId,
    ) -> Result<CreateReviewersResponse, ApiException>;
}

/// The conference the operator is working on, supplied by whoever hosts the
/// session. Operations that need it fail with
/// [`EnrollmentError::MissingConferenceContext`] when it is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConferenceContext {
    conference_id: Option<ConferenceId>,
}

impl ConferenceContext {
    pub fn new(conference_id: Option<ConferenceId>) -> Self {
        Self { conference_id }
    }

    pub fn active(conference_id: ConferenceId) -> Self {
        Self::new(Some(conference_id))
    }

    pub fn conference_id(&self) -> Option<&ConferenceId> {
        self.conference_id.as_ref()
    }

    pub fn require(&self) -> error::Result<&ConferenceId> {
        self.conference_id
            .as_ref()
            .ok_or(EnrollmentError::MissingConferenceContext)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentEvent {
    /// No conference is active; the host should send the operator to the
    /// conference selection flow.
    ConferenceSelectionRequired,
    TracksLoaded {
        conference_name: String,
        track_count: usize,
    },
    ExistingReviewersRefreshed {
        track_id: TrackId,
        reviewer_count: usize,
    },
    StagingChanged {
        staged: usize,
    },
    ImportableMembersLoaded {
        member_count: usize,
    },
    ImportRejected {
        message: String,
    },
    /// An edit was confirmed for a row that is not in the batch, so it had
    /// no effect; only staged candidates can be edited.
    EditNotStaged {
        email: String,
    },
    ImportSelectionChanged {
        member_id: MemberId,
        selected: bool,
    },
    CommitSucceeded {
        committed: usize,
    },
    CommitSuccessCleared,
    CommitRejected {
        message: String,
    },
    /// A failure the operator gets a generic notice for; staged data is kept.
    Error(String),
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
