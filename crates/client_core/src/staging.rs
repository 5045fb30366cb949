//! Candidates staged for the next batch commit.
//!
//! The list keeps insertion order and holds at most one candidate per email.
//! Lookups are linear; batches are tens to low hundreds of entries.

use std::collections::HashSet;

use shared::domain::MemberId;
use tracing::{debug, warn};

use crate::{
    candidate::{Candidate, CandidateUpdate, ReviewerDetails},
    error::{EnrollmentError, Result},
};

#[derive(Debug, Clone, Default)]
pub struct CandidateStagingList {
    candidates: Vec<Candidate>,
    editing: Option<String>,
}

impl CandidateStagingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.candidates.iter().any(|c| c.email() == email)
    }

    pub fn get(&self, email: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.email() == email)
    }

    pub fn add(&mut self, candidate: Candidate) -> Result<()> {
        if self.contains_email(candidate.email()) {
            warn!(email = candidate.email(), "staging: rejected duplicate email");
            return Err(EnrollmentError::DuplicateEmail {
                email: candidate.email().to_string(),
            });
        }
        self.candidates.push(candidate);
        Ok(())
    }

    /// Email of the row currently selected for editing, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Enters editing mode for `email` and returns the staged details to
    /// prefill the form with, when that email is staged.
    pub fn begin_edit(&mut self, email: &str) -> Option<ReviewerDetails> {
        self.editing = Some(email.to_string());
        self.get(email).map(|c| c.details().clone())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Replaces the fields of the first candidate whose email is `email`.
    ///
    /// Returns whether a candidate was replaced. The editing flag is cleared
    /// either way.
    pub fn edit(&mut self, email: &str, update: CandidateUpdate) -> Result<bool> {
        if self.editing.take().is_none() {
            return Err(EnrollmentError::NotEditing);
        }
        match self.candidates.iter_mut().find(|c| c.email() == email) {
            Some(candidate) => {
                candidate.apply(update);
                Ok(true)
            }
            None => {
                debug!(email, "staging: edit target is not staged");
                Ok(false)
            }
        }
    }

    pub fn remove(&mut self, email: &str) -> Option<Candidate> {
        let index = self.candidates.iter().position(|c| c.email() == email)?;
        if self.editing.as_deref() == Some(email) {
            self.editing = None;
        }
        Some(self.candidates.remove(index))
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.editing = None;
    }

    /// Appends every candidate or none of them.
    ///
    /// A member whose identifier is already staged rejects the whole batch.
    /// Email collisions, against the list or inside the batch, reject it too.
    pub fn import_many(&mut self, incoming: Vec<Candidate>) -> Result<usize> {
        let colliding: Vec<MemberId> = incoming
            .iter()
            .filter_map(Candidate::member_id)
            .filter(|id| self.candidates.iter().any(|c| c.member_id() == Some(*id)))
            .cloned()
            .collect();
        if !colliding.is_empty() {
            warn!(
                count = colliding.len(),
                "staging: import rejected, members already staged"
            );
            return Err(EnrollmentError::DuplicateImport {
                member_ids: colliding,
            });
        }

        let mut seen: HashSet<&str> = self.candidates.iter().map(Candidate::email).collect();
        for candidate in &incoming {
            if !seen.insert(candidate.email()) {
                warn!(email = candidate.email(), "staging: import rejected, email clash");
                return Err(EnrollmentError::DuplicateEmail {
                    email: candidate.email().to_string(),
                });
            }
        }

        let added = incoming.len();
        self.candidates.extend(incoming);
        Ok(added)
    }
}

#[cfg(test)]
#[path = "tests/staging_tests.rs"]
mod tests;
