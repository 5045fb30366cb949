use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CommittedReviewer, ConferenceId, Track, TrackId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
    pub conference_name: String,
}

/// One row of a batch commit. Optional identity fields are not part of the
/// create payload; only what the server registers is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReviewer {
    pub name: String,
    pub affiliation: String,
    pub country: String,
    #[serde(default)]
    pub mobile: Option<String>,
    pub email: String,
    pub tracks: Vec<TrackId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReviewersRequest {
    pub reviewers: Vec<NewReviewer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReviewersResponse {
    #[serde(default)]
    pub reviewers: Vec<CommittedReviewer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Body of an HTTP 400 returned by the create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl ValidationErrorBody {
    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.error.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PreviousMembersQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<NaiveDate>,
}

pub fn conference_tracks_route(conference_id: &ConferenceId) -> String {
    format!("/conferences/{conference_id}/tracks")
}

pub fn track_reviewers_route(track_id: &TrackId) -> String {
    format!("/tracks/{track_id}/reviewers")
}

pub fn previous_members_route(conference_id: &ConferenceId) -> String {
    format!("/conferences/{conference_id}/reviewers/previous")
}
