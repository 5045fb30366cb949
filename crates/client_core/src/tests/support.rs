//! In-memory [`ConferenceApi`] for exercising the workflow without a server.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::{CommittedReviewer, ConferenceId, ImportableMember, MemberId, Track, TrackId},
    error::ApiException,
    protocol::{CreateReviewersRequest, CreateReviewersResponse, TracksResponse},
};
use tokio::sync::{Mutex, Notify};

use crate::ConferenceApi;

pub(crate) fn track(id: &str, name: &str) -> Track {
    Track {
        id: TrackId::from(id),
        name: name.to_string(),
    }
}

pub(crate) fn member(id: &str, name: &str, email: &str) -> ImportableMember {
    ImportableMember {
        id: MemberId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        affiliation: Some("IISc".to_string()),
        country: Some("India".to_string()),
        mobile: None,
        google_scholar_id: None,
        orcid_id: Some(format!("0000-{id}")),
    }
}

pub(crate) fn committed(name: &str, email: &str, tracks: &[&str]) -> CommittedReviewer {
    CommittedReviewer {
        name: name.to_string(),
        email: email.to_string(),
        tracks: tracks.iter().map(|t| TrackId::from(*t)).collect(),
    }
}

pub(crate) struct FakeConferenceApi {
    pub tracks: Mutex<Result<TracksResponse, ApiException>>,
    pub reviewers: Mutex<HashMap<TrackId, Vec<CommittedReviewer>>>,
    pub reviewer_gates: Mutex<HashMap<TrackId, Arc<Notify>>>,
    pub members: Mutex<Result<Vec<ImportableMember>, ApiException>>,
    pub member_queries: Mutex<Vec<(ConferenceId, Option<NaiveDate>)>>,
    /// `None` echoes the submitted reviewers back.
    pub create_response: Mutex<Option<Result<CreateReviewersResponse, ApiException>>>,
    pub create_calls: Mutex<Vec<(TrackId, CreateReviewersRequest)>>,
    pub create_gate: Mutex<Option<Arc<Notify>>>,
    pub track_calls: Mutex<u32>,
}

impl FakeConferenceApi {
    pub fn new() -> Self {
        Self {
            tracks: Mutex::new(Ok(TracksResponse {
                tracks: vec![track("t1", "systems"), track("t2", "theory")],
                conference_name: "icsc 2026".to_string(),
            })),
            reviewers: Mutex::new(HashMap::new()),
            reviewer_gates: Mutex::new(HashMap::new()),
            members: Mutex::new(Ok(Vec::new())),
            member_queries: Mutex::new(Vec::new()),
            create_response: Mutex::new(None),
            create_calls: Mutex::new(Vec::new()),
            create_gate: Mutex::new(None),
            track_calls: Mutex::new(0),
        }
    }

    pub async fn with_reviewers(self, track_id: &str, reviewers: Vec<CommittedReviewer>) -> Self {
        self.reviewers
            .lock()
            .await
            .insert(TrackId::from(track_id), reviewers);
        self
    }

    pub async fn with_members(self, members: Vec<ImportableMember>) -> Self {
        *self.members.lock().await = Ok(members);
        self
    }

    pub async fn fail_create_with(&self, err: ApiException) {
        *self.create_response.lock().await = Some(Err(err));
    }

    pub async fn echo_creates(&self) {
        *self.create_response.lock().await = None;
    }

    /// Holds create responses until the returned handle is notified.
    pub async fn gate_creates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().await = Some(Arc::clone(&gate));
        gate
    }

    /// Holds responses for `track_id` until the returned handle is notified.
    pub async fn gate_reviewers(&self, track_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.reviewer_gates
            .lock()
            .await
            .insert(TrackId::from(track_id), Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl ConferenceApi for FakeConferenceApi {
    async fn get_tracks(&self, _conference_id: &ConferenceId) -> Result<TracksResponse, ApiException> {
        *self.track_calls.lock().await += 1;
        self.tracks.lock().await.clone()
    }

    async fn get_reviewers_by_track(
        &self,
        track_id: &TrackId,
    ) -> Result<Vec<CommittedReviewer>, ApiException> {
        let gate = self.reviewer_gates.lock().await.get(track_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self
            .reviewers
            .lock()
            .await
            .get(track_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_importable_members(
        &self,
        conference_id: &ConferenceId,
        before: Option<NaiveDate>,
    ) -> Result<Vec<ImportableMember>, ApiException> {
        self.member_queries
            .lock()
            .await
            .push((conference_id.clone(), before));
        self.members.lock().await.clone()
    }

    async fn create_reviewers(
        &self,
        request: &CreateReviewersRequest,
        primary_track: &TrackId,
    ) -> Result<CreateReviewersResponse, ApiException> {
        self.create_calls
            .lock()
            .await
            .push((primary_track.clone(), request.clone()));
        let gate = self.create_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.create_response.lock().await.clone() {
            Some(response) => response,
            None => Ok(CreateReviewersResponse {
                reviewers: request
                    .reviewers
                    .iter()
                    .map(|r| CommittedReviewer {
                        name: r.name.clone(),
                        email: r.email.clone(),
                        tracks: r.tracks.clone(),
                    })
                    .collect(),
            }),
        }
    }
}
