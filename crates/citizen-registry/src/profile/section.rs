//! Profile sections — single sub-group updates.
//!
//! The UI edits one sub-group at a time. A section update is always turned
//! into a full-record re-submission: the current profile is read, the one
//! sub-group is replaced, and the union is appended as a new version.

use serde::{Deserialize, Serialize};

use super::types::*;

/// One sub-group of a [`Profile`], tagged by name.
///
/// JSON form: `{ "section": "address", "fields": { "homeAddress": ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "fields", rename_all = "snake_case")]
pub enum ProfileSection {
    Personal(PersonalInfo),
    Account(AccountInfo),
    Address(AddressInfo),
    Education(EducationInfo),
    Household(HouseholdInfo),
    Income(IncomeInfo),
    Employment(EmploymentInfo),
    Commitment(CommitmentInfo),
    Relief(ReliefInfo),
}

impl ProfileSection {
    /// Return a stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Personal(_) => "personal",
            Self::Account(_) => "account",
            Self::Address(_) => "address",
            Self::Education(_) => "education",
            Self::Household(_) => "household",
            Self::Income(_) => "income",
            Self::Employment(_) => "employment",
            Self::Commitment(_) => "commitment",
            Self::Relief(_) => "relief",
        }
    }
}

impl Profile {
    /// Return a copy of this profile with one sub-group replaced.
    pub fn with_section(&self, section: ProfileSection) -> Profile {
        let mut next = self.clone();
        match section {
            ProfileSection::Personal(v) => next.personal = v,
            ProfileSection::Account(v) => next.account = v,
            ProfileSection::Address(v) => next.address = v,
            ProfileSection::Education(v) => next.education = v,
            ProfileSection::Household(v) => next.household = v,
            ProfileSection::Income(v) => next.income = v,
            ProfileSection::Employment(v) => next.employment = v,
            ProfileSection::Commitment(v) => next.commitment = v,
            ProfileSection::Relief(v) => next.relief = v,
        }
        next
    }
}
