//! Data structures for citizen profiles.
//!
//! A [`Profile`] is the full payload stored in every version. It is made of
//! fixed sub-groups that serialize *flat* under the field names the UI layer
//! renders directly, so a stored version reads as one object:
//!
//! ```json
//! { "fullName": "...", "gender": "...", "DOB": 0, "passwordHash": "...",
//!   "homeAddress": "...", "state": "...", ... "reliefAmount": 0 }
//! ```
//!
//! Unset fields are the empty string or zero. There are no separate
//! "is set" flags; missing keys deserialize to those defaults.

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

// ---------------------------------------------------------------------------
// Citizen identifier
// ---------------------------------------------------------------------------

/// Externally assigned citizen identifier (e.g. a national ID number).
///
/// Primary key of the record store, permission table and staging area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CitizenId(String);

impl CitizenId {
    /// Validate and wrap an identifier.
    ///
    /// Surrounding whitespace is trimmed. Empty identifiers and identifiers
    /// containing control characters are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidInput(
                "citizen identifier must not be empty".into(),
            ));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(RegistryError::InvalidInput(format!(
                "citizen identifier contains control characters: {trimmed:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CitizenId {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CitizenId> for String {
    fn from(id: CitizenId) -> Self {
        id.0
    }
}

impl std::str::FromStr for CitizenId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl std::fmt::Display for CitizenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Sub-groups
// ---------------------------------------------------------------------------

/// Identity: name, sex and date of birth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub gender: String,
    /// Seconds since 1900-01-01T00:00:00Z (see [`crate::time::dob_offset_from_date`]).
    #[serde(rename = "DOB")]
    pub dob: u64,
}

/// Account secret hash used to authenticate the citizen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountInfo {
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressInfo {
    pub home_address: String,
    pub state: String,
    pub city: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationInfo {
    pub education_level: String,
    pub graduation_year: u64,
    pub institution: String,
}

/// Household / financial situation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HouseholdInfo {
    pub household_size: u64,
    pub household_income: u64,
    pub dependents: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomeInfo {
    pub income_source: String,
    pub income_frequency: String,
    pub income_amount: u64,
    pub income_notes: String,
}

/// Occupation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmploymentInfo {
    pub occupation: String,
    pub employer: String,
    pub years_of_experience: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitmentInfo {
    pub commitment_type: String,
    pub commitment_details: String,
    pub commitment_amount: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReliefInfo {
    pub relief_type: String,
    pub relief_details: String,
    pub relief_amount: u64,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Complete citizen profile payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub personal: PersonalInfo,
    #[serde(flatten)]
    pub account: AccountInfo,
    #[serde(flatten)]
    pub address: AddressInfo,
    #[serde(flatten)]
    pub education: EducationInfo,
    #[serde(flatten)]
    pub household: HouseholdInfo,
    #[serde(flatten)]
    pub income: IncomeInfo,
    #[serde(flatten)]
    pub employment: EmploymentInfo,
    #[serde(flatten)]
    pub commitment: CommitmentInfo,
    #[serde(flatten)]
    pub relief: ReliefInfo,
}

impl Profile {
    /// Seed profile used at registration: identity and account secret only,
    /// every other sub-group left unset.
    pub fn seed(
        full_name: impl Into<String>,
        gender: impl Into<String>,
        dob: u64,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            personal: PersonalInfo {
                full_name: full_name.into(),
                gender: gender.into(),
                dob,
            },
            account: AccountInfo {
                password_hash: password_hash.into(),
            },
            ..Self::default()
        }
    }

    /// Parse a profile from its flat JSON form.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SerializationError` if the JSON is malformed or
    /// a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RegistryError::SerializationError(e.to_string()))
    }

    /// Render the profile in its flat JSON form.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))
    }
}
