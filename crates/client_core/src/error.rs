use shared::{
    domain::{MemberId, TrackId},
    error::{ApiException, ErrorCode},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    #[error("no active conference; select a conference to proceed")]
    MissingConferenceContext,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("email {email} already exists in this batch; use a different email")]
    DuplicateEmail { email: String },
    #[error("some of the selected members are already added ({})", format_ids(.member_ids))]
    DuplicateImport { member_ids: Vec<MemberId> },
    #[error("{0}")]
    ValidationRejected(String),
    #[error("request failed: {0}")]
    TransportFailure(String),
    #[error("no candidate is selected for editing")]
    NotEditing,
    #[error("track {0} is not part of this conference")]
    UnknownTrack(TrackId),
    #[error("member {0} is not in the importable list")]
    UnknownMember(MemberId),
    #[error("select a track first")]
    NoTrackSelected,
    #[error("assign at least one track to the reviewers")]
    NoTracksAssigned,
    #[error("no candidates are staged")]
    EmptyBatch,
    #[error("a commit is already in flight")]
    CommitInFlight,
}

/// Coarse grouping the presentation layer uses to pick between a blocking
/// alert, a banner, or a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Precondition,
    Duplicate,
    Rejected,
    Transport,
}

impl EnrollmentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateEmail { .. } | Self::DuplicateImport { .. } => ErrorCategory::Duplicate,
            Self::ValidationRejected(_) | Self::NotFound(_) => ErrorCategory::Rejected,
            Self::TransportFailure(_) => ErrorCategory::Transport,
            Self::MissingConferenceContext
            | Self::NotEditing
            | Self::UnknownTrack(_)
            | Self::UnknownMember(_)
            | Self::NoTrackSelected
            | Self::NoTracksAssigned
            | Self::EmptyBatch
            | Self::CommitInFlight => ErrorCategory::Precondition,
        }
    }

    pub fn requires_conference_selection(&self) -> bool {
        matches!(self, Self::MissingConferenceContext)
    }
}

impl From<ApiException> for EnrollmentError {
    fn from(value: ApiException) -> Self {
        match value.code {
            ErrorCode::NotFound => Self::NotFound(value.message),
            ErrorCode::Validation => Self::ValidationRejected(value.message),
            ErrorCode::Transport => Self::TransportFailure(value.to_string()),
        }
    }
}

fn format_ids(ids: &[MemberId]) -> String {
    ids.iter()
        .map(MemberId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = EnrollmentError> = std::result::Result<T, E>;
