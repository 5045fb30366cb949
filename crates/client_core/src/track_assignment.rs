use std::collections::BTreeSet;

use shared::domain::TrackId;

/// Tracks the next batch commit assigns its reviewers to. Independent of
/// which track's reviewers are on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackAssignmentSet {
    tracks: BTreeSet<TrackId>,
}

impl TrackAssignmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkbox semantics. Returns whether `track_id` is assigned afterwards.
    pub fn toggle(&mut self, track_id: &TrackId) -> bool {
        if self.tracks.remove(track_id) {
            false
        } else {
            self.tracks.insert(track_id.clone());
            true
        }
    }

    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.tracks.contains(track_id)
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn snapshot(&self) -> Vec<TrackId> {
        self.tracks.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
