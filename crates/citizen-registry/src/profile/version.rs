//! Immutable profile versions.
//!
//! Every write produces a new [`ProfileVersion`]; existing versions are never
//! altered. Each version carries a SHA-256 digest over its number, submitter
//! and payload so that a stored history can be checked for tampering.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::types::Profile;

/// One immutable snapshot of a citizen's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileVersion {
    /// Sequence number, contiguous per citizen and starting at 1.
    pub number: u64,
    /// The stored payload.
    pub profile: Profile,
    /// Name of the submitting organization; empty for self-service.
    pub submitted_by: String,
    /// Creation timestamp (microseconds since epoch).
    pub created_at: u64,
    /// Hex SHA-256 over number, submitter and payload.
    pub digest: String,
}

impl ProfileVersion {
    /// Build version `number` stamped with the current time.
    pub fn new(number: u64, profile: Profile, submitted_by: impl Into<String>) -> Self {
        let submitted_by = submitted_by.into();
        let digest = compute_digest(number, &submitted_by, &profile);
        Self {
            number,
            profile,
            submitted_by,
            created_at: crate::time::now_micros(),
            digest,
        }
    }

    /// `true` when the version was written by the citizen themself.
    pub fn is_self_service(&self) -> bool {
        self.submitted_by.is_empty()
    }

    /// Recompute the digest and compare with the stored one.
    pub fn verify_digest(&self) -> bool {
        compute_digest(self.number, &self.submitted_by, &self.profile) == self.digest
    }
}

fn compute_digest(number: u64, submitted_by: &str, profile: &Profile) -> String {
    let profile_json = serde_json::to_string(profile).unwrap_or_default();
    let hash_input = format!("{number}:{submitted_by}:{profile_json}");
    hex::encode(Sha256::digest(hash_input.as_bytes()))
}
