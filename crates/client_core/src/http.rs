//! reqwest-backed [`ConferenceApi`].

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CommittedReviewer, ConferenceId, ImportableMember, TrackId},
    error::{ApiException, ErrorCode},
    protocol::{
        conference_tracks_route, previous_members_route, track_reviewers_route,
        CreateReviewersRequest, CreateReviewersResponse, PreviousMembersQuery, TracksResponse,
        ValidationErrorBody,
    },
};
use tracing::debug;
use url::Url;

use crate::ConferenceApi;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpConferenceApi {
    http: Client,
    server_url: String,
}

impl HttpConferenceApi {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(server_url.trim())
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(anyhow!("server_url must start with http:// or https://"));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            server_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.server_url)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiException> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiException::transport(err.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiException> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|err| ApiException::transport(format!("invalid response body: {err}")));
    }

    let code = ErrorCode::from_status(status.as_u16());
    let body = response.text().await.unwrap_or_default();
    debug!(%status, body = %body, "http: request failed");
    let message = match code {
        ErrorCode::Validation => serde_json::from_str::<ValidationErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.first_message().map(str::to_string))
            .unwrap_or_else(|| format!("request rejected by server ({status})")),
        _ if body.trim().is_empty() => status.to_string(),
        _ => format!("{status}: {}", body.trim()),
    };
    Err(ApiException::new(code, message))
}

#[async_trait]
impl ConferenceApi for HttpConferenceApi {
    async fn get_tracks(&self, conference_id: &ConferenceId) -> Result<TracksResponse, ApiException> {
        Self::send(self.http.get(self.url(&conference_tracks_route(conference_id)))).await
    }

    async fn get_reviewers_by_track(
        &self,
        track_id: &TrackId,
    ) -> Result<Vec<CommittedReviewer>, ApiException> {
        Self::send(self.http.get(self.url(&track_reviewers_route(track_id)))).await
    }

    async fn get_importable_members(
        &self,
        conference_id: &ConferenceId,
        before: Option<NaiveDate>,
    ) -> Result<Vec<ImportableMember>, ApiException> {
        Self::send(
            self.http
                .get(self.url(&previous_members_route(conference_id)))
                .query(&PreviousMembersQuery { before }),
        )
        .await
    }

    async fn create_reviewers(
        &self,
        request: &CreateReviewersRequest,
        primary_track: &TrackId,
    ) -> Result<CreateReviewersResponse, ApiException> {
        Self::send(
            self.http
                .post(self.url(&track_reviewers_route(primary_track)))
                .json(request),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
