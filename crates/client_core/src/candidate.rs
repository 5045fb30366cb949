use serde::{Deserialize, Serialize};
use shared::{
    domain::{CommittedReviewer, ImportableMember, MemberId, TrackId},
    protocol::NewReviewer,
};

/// Everything the registration form collects for one reviewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerDetails {
    pub name: String,
    pub email: String,
    pub affiliation: String,
    pub country: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub google_scholar_id: Option<String>,
    #[serde(default)]
    pub orcid_id: Option<String>,
}

impl ReviewerDetails {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = affiliation.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    fn apply(&mut self, update: CandidateUpdate) {
        self.name = update.name;
        self.affiliation = update.affiliation;
        self.country = update.country;
        self.mobile = update.mobile;
        self.google_scholar_id = update.google_scholar_id;
        self.orcid_id = update.orcid_id;
    }
}

impl From<&ImportableMember> for ReviewerDetails {
    fn from(member: &ImportableMember) -> Self {
        Self {
            name: member.name.clone(),
            email: member.email.clone(),
            affiliation: member.affiliation.clone().unwrap_or_default(),
            country: member.country.clone().unwrap_or_default(),
            mobile: member.mobile.clone(),
            google_scholar_id: member.google_scholar_id.clone(),
            orcid_id: member.orcid_id.clone(),
        }
    }
}

impl From<&CommittedReviewer> for ReviewerDetails {
    fn from(reviewer: &CommittedReviewer) -> Self {
        Self::new(reviewer.name.clone(), reviewer.email.clone())
    }
}

/// Editable fields of a staged candidate. The email is deliberately absent:
/// it is the lookup key of an edit and cannot change through one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUpdate {
    pub name: String,
    pub affiliation: String,
    pub country: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub google_scholar_id: Option<String>,
    #[serde(default)]
    pub orcid_id: Option<String>,
}

impl From<ReviewerDetails> for CandidateUpdate {
    fn from(details: ReviewerDetails) -> Self {
        Self {
            name: details.name,
            affiliation: details.affiliation,
            country: details.country,
            mobile: details.mobile,
            google_scholar_id: details.google_scholar_id,
            orcid_id: details.orcid_id,
        }
    }
}

/// A reviewer held in local staging until the batch is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Candidate {
    Typed(ReviewerDetails),
    Imported {
        member_id: MemberId,
        details: ReviewerDetails,
    },
}

impl Candidate {
    pub fn details(&self) -> &ReviewerDetails {
        match self {
            Self::Typed(details) | Self::Imported { details, .. } => details,
        }
    }

    pub fn email(&self) -> &str {
        &self.details().email
    }

    pub fn name(&self) -> &str {
        &self.details().name
    }

    pub fn member_id(&self) -> Option<&MemberId> {
        match self {
            Self::Typed(_) => None,
            Self::Imported { member_id, .. } => Some(member_id),
        }
    }

    pub(crate) fn apply(&mut self, update: CandidateUpdate) {
        match self {
            Self::Typed(details) | Self::Imported { details, .. } => details.apply(update),
        }
    }

    pub fn to_new_reviewer(&self, tracks: &[TrackId]) -> NewReviewer {
        let details = self.details();
        NewReviewer {
            name: details.name.clone(),
            affiliation: details.affiliation.clone(),
            country: details.country.clone(),
            mobile: details.mobile.clone(),
            email: details.email.clone(),
            tracks: tracks.to_vec(),
        }
    }
}

impl From<&ImportableMember> for Candidate {
    fn from(member: &ImportableMember) -> Self {
        Self::Imported {
            member_id: member.id.clone(),
            details: ReviewerDetails::from(member),
        }
    }
}
