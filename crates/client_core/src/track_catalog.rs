use shared::{
    domain::{Conference, ConferenceId, Track, TrackId},
    error::ApiException,
    protocol::TracksResponse,
};
use tracing::{error, info};

use crate::{error::Result, ConferenceContext};

/// Tracks of the active conference, in server order.
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    conference: Option<Conference>,
    tracks: Vec<Track>,
    loading: bool,
}

impl TrackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn conference(&self) -> Option<&Conference> {
        self.conference.as_ref()
    }

    pub fn get(&self, track_id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == track_id)
    }

    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.get(track_id).is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.conference.is_some()
    }

    /// Empties the catalog and marks it loading. Fails without touching the
    /// network when no conference is active.
    pub fn begin_load(&mut self, ctx: &ConferenceContext) -> Result<ConferenceId> {
        self.tracks.clear();
        self.conference = None;
        let conference_id = ctx.require()?.clone();
        self.loading = true;
        Ok(conference_id)
    }

    pub fn apply_load(
        &mut self,
        conference_id: ConferenceId,
        fetched: std::result::Result<TracksResponse, ApiException>,
    ) -> Result<usize> {
        self.loading = false;
        match fetched {
            Ok(response) => {
                info!(
                    conference_id = %conference_id,
                    count = response.tracks.len(),
                    "catalog: loaded tracks"
                );
                self.conference = Some(Conference {
                    id: conference_id,
                    name: response.conference_name,
                });
                self.tracks = response.tracks;
                Ok(self.tracks.len())
            }
            Err(err) => {
                error!(conference_id = %conference_id, error = %err, "catalog: failed to load tracks");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/track_catalog_tests.rs"]
mod tests;
