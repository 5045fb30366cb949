use std::collections::HashSet;

use chrono::NaiveDate;
use shared::{
    domain::{ImportableMember, MemberId},
    error::ApiException,
};
use tracing::{info, warn};

use crate::{
    candidate::Candidate,
    error::{EnrollmentError, Result},
    staging::CandidateStagingList,
};

/// Previously registered members the operator can pull into the batch.
#[derive(Debug, Clone, Default)]
pub struct ImportSelector {
    members: Vec<ImportableMember>,
    selected: HashSet<MemberId>,
    cutoff: Option<NaiveDate>,
}

impl ImportSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[ImportableMember] {
        &self.members
    }

    pub fn cutoff(&self) -> Option<NaiveDate> {
        self.cutoff
    }

    pub fn get(&self, member_id: &MemberId) -> Option<&ImportableMember> {
        self.members.iter().find(|m| &m.id == member_id)
    }

    pub fn is_selected(&self, member_id: &MemberId) -> bool {
        self.selected.contains(member_id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Replaces the importable set with a fetch result. Selections that no
    /// longer resolve are dropped.
    pub fn apply_load(
        &mut self,
        cutoff: Option<NaiveDate>,
        fetched: std::result::Result<Vec<ImportableMember>, ApiException>,
    ) -> Result<usize> {
        let members = fetched.map_err(|err| {
            warn!(error = %err, "import: failed to load previous members");
            EnrollmentError::from(err)
        })?;
        info!(count = members.len(), ?cutoff, "import: loaded previous members");
        self.members = members;
        self.cutoff = cutoff;
        let members = &self.members;
        self.selected.retain(|id| members.iter().any(|m| &m.id == id));
        Ok(self.members.len())
    }

    /// Flips membership of `member_id` in the selection. Returns whether it
    /// is selected afterwards.
    pub fn toggle_select(&mut self, member_id: &MemberId) -> Result<bool> {
        if self.get(member_id).is_none() {
            return Err(EnrollmentError::UnknownMember(member_id.clone()));
        }
        if self.selected.remove(member_id) {
            Ok(false)
        } else {
            self.selected.insert(member_id.clone());
            Ok(true)
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Moves the selected members into `staging` as one batch. The selection
    /// is cleared whether or not staging accepts it.
    pub fn commit_selection(&mut self, staging: &mut CandidateStagingList) -> Result<usize> {
        let resolved: Vec<Candidate> = self
            .members
            .iter()
            .filter(|m| self.selected.contains(&m.id))
            .map(Candidate::from)
            .collect();
        self.selected.clear();
        staging.import_many(resolved)
    }
}

#[cfg(test)]
#[path = "tests/import_selector_tests.rs"]
mod tests;
