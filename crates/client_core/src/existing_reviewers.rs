use shared::{
    domain::{CommittedReviewer, TrackId},
    error::ApiException,
};
use tracing::{info, warn};

use crate::error::Result;

/// Identifies one issued refresh. Responses carrying an older ticket than the
/// latest issued one are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
    track_id: TrackId,
}

impl RefreshTicket {
    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }
}

/// Reviewers already committed to the track on display.
#[derive(Debug, Clone, Default)]
pub struct ExistingReviewersView {
    track_id: Option<TrackId>,
    reviewers: Vec<CommittedReviewer>,
    latest_seq: u64,
    loading: bool,
}

impl ExistingReviewersView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_id(&self) -> Option<&TrackId> {
        self.track_id.as_ref()
    }

    pub fn reviewers(&self) -> &[CommittedReviewer] {
        &self.reviewers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, email: &str) -> Option<&CommittedReviewer> {
        self.reviewers.iter().find(|r| r.email == email)
    }

    /// Switches the view to `track_id`, discarding whatever the previous
    /// track showed, and issues a ticket for the fetch that will fill it.
    pub fn begin_refresh(&mut self, track_id: TrackId) -> RefreshTicket {
        self.latest_seq += 1;
        self.track_id = Some(track_id.clone());
        self.reviewers.clear();
        self.loading = true;
        RefreshTicket {
            seq: self.latest_seq,
            track_id,
        }
    }

    /// Applies a fetch result. Returns `Ok(false)` when the ticket is stale.
    pub fn apply_refresh(
        &mut self,
        ticket: &RefreshTicket,
        fetched: std::result::Result<Vec<CommittedReviewer>, ApiException>,
    ) -> Result<bool> {
        if ticket.seq != self.latest_seq {
            warn!(
                track_id = %ticket.track_id,
                seq = ticket.seq,
                latest = self.latest_seq,
                "reviewers: dropping stale refresh"
            );
            return Ok(false);
        }
        self.loading = false;
        match fetched {
            Ok(reviewers) => {
                info!(track_id = %ticket.track_id, count = reviewers.len(), "reviewers: refreshed");
                self.reviewers = reviewers;
                Ok(true)
            }
            Err(err) => {
                warn!(track_id = %ticket.track_id, error = %err, "reviewers: refresh failed");
                Err(err.into())
            }
        }
    }

    /// Folds server-confirmed reviewers into the view without re-fetching.
    /// A reviewer already shown is replaced in place; the rest are appended.
    /// Returns how many rows were appended.
    pub fn absorb(&mut self, committed: &[CommittedReviewer]) -> usize {
        let mut appended = 0;
        for reviewer in committed {
            match self.reviewers.iter_mut().find(|r| r.email == reviewer.email) {
                Some(existing) => *existing = reviewer.clone(),
                None => {
                    self.reviewers.push(reviewer.clone());
                    appended += 1;
                }
            }
        }
        appended
    }
}

#[cfg(test)]
#[path = "tests/existing_reviewers_tests.rs"]
mod tests;
