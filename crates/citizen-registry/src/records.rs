//! Record store — the append-only version history of every citizen.
//!
//! Each citizen owns a run of immutable [`ProfileVersion`]s numbered from 1
//! with no gaps, plus a current-version pointer into that run. Versions are
//! never overwritten or deleted; "applying" an older version only moves the
//! pointer.
//!
//! Every operation takes the store lock once, so it is either fully applied
//! or not applied at all. Multi-step sequences for one citizen (read, then
//! append) are serialized by the coordinator's per-citizen locks.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::profile::{CitizenId, Profile, ProfileVersion};

// ── CitizenHistory ───────────────────────────────────────────────────────────

/// The full version run and current pointer for one citizen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenHistory {
    pub citizen: CitizenId,
    /// Number of the version that reads as current.
    pub current: u64,
    /// Versions in ascending order; `versions[i].number == i + 1`.
    pub versions: Vec<ProfileVersion>,
}

impl CitizenHistory {
    fn latest(&self) -> u64 {
        self.versions.len() as u64
    }

    fn version(&self, n: u64) -> Result<&ProfileVersion> {
        if n == 0 || n > self.latest() {
            return Err(invalid_version(&self.citizen, n, self.latest()));
        }
        Ok(&self.versions[(n - 1) as usize])
    }

    /// Check the contiguous-run, pointer and digest invariants.
    pub fn validate(&self) -> Result<()> {
        if self.versions.is_empty() {
            return Err(RegistryError::InvalidFileFormat(format!(
                "citizen {} has no versions",
                self.citizen
            )));
        }
        for (i, v) in self.versions.iter().enumerate() {
            let expected = i as u64 + 1;
            if v.number != expected {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "citizen {}: version {} found where {} expected",
                    self.citizen, v.number, expected
                )));
            }
            if !v.verify_digest() {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "citizen {}: version {} digest mismatch",
                    self.citizen, v.number
                )));
            }
        }
        if self.current == 0 || self.current > self.latest() {
            return Err(RegistryError::InvalidFileFormat(format!(
                "citizen {}: current pointer {} outside 1..={}",
                self.citizen,
                self.current,
                self.latest()
            )));
        }
        Ok(())
    }
}

fn invalid_version(citizen: &CitizenId, version: u64, latest: u64) -> RegistryError {
    RegistryError::InvalidVersion {
        citizen: citizen.to_string(),
        version,
        latest,
    }
}

// ── RecordStore ──────────────────────────────────────────────────────────────

/// In-memory, append-only store of citizen profile versions.
pub struct RecordStore {
    citizens: RwLock<HashMap<CitizenId, CitizenHistory>>,
    /// Optional cap on the length of any one citizen's version run.
    max_versions: Option<u64>,
}

impl RecordStore {
    /// Create an empty store with no version cap.
    pub fn new() -> Self {
        Self::with_version_limit(None)
    }

    /// Create an empty store that refuses to grow any citizen's run past
    /// `max_versions`.
    pub fn with_version_limit(max_versions: Option<u64>) -> Self {
        Self {
            citizens: RwLock::new(HashMap::new()),
            max_versions,
        }
    }

    /// Rebuild a store from saved histories, validating every invariant.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` if a history has gaps, a
    /// dangling pointer, a digest mismatch, or a duplicate citizen.
    pub fn from_histories(
        histories: Vec<CitizenHistory>,
        max_versions: Option<u64>,
    ) -> Result<Self> {
        let mut citizens = HashMap::with_capacity(histories.len());
        for history in histories {
            history.validate()?;
            let id = history.citizen.clone();
            if citizens.insert(id.clone(), history).is_some() {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "duplicate history for citizen {id}"
                )));
            }
        }
        Ok(Self {
            citizens: RwLock::new(citizens),
            max_versions,
        })
    }

    /// Clone every history, ordered by citizen identifier.
    pub fn histories(&self) -> Result<Vec<CitizenHistory>> {
        let citizens = self.read()?;
        let mut out: Vec<CitizenHistory> = citizens.values().cloned().collect();
        out.sort_by(|a, b| a.citizen.cmp(&b.citizen));
        Ok(out)
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    /// Create version 1 for a citizen and point current at it.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AlreadyRegistered` if any version exists.
    pub fn register(&self, citizen: &CitizenId, profile: Profile) -> Result<u64> {
        let mut citizens = self.write()?;
        if citizens.contains_key(citizen) {
            return Err(RegistryError::AlreadyRegistered(citizen.to_string()));
        }
        citizens.insert(
            citizen.clone(),
            CitizenHistory {
                citizen: citizen.clone(),
                current: 1,
                versions: vec![ProfileVersion::new(1, profile, "")],
            },
        );
        log::debug!("record store: registered {citizen} at version 1");
        Ok(1)
    }

    /// Append a new version after the latest and make it current.
    ///
    /// `submitted_by` is the submitting organization's name, empty for
    /// self-service.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotRegistered` if the citizen has no version 1,
    /// or `RegistryError::VersionLimitReached` if the run is at its cap.
    pub fn append(&self, citizen: &CitizenId, profile: Profile, submitted_by: &str) -> Result<u64> {
        let mut citizens = self.write()?;
        let history = citizens
            .get_mut(citizen)
            .ok_or_else(|| RegistryError::NotRegistered(citizen.to_string()))?;

        if let Some(limit) = self.max_versions {
            if history.latest() >= limit {
                return Err(RegistryError::VersionLimitReached {
                    citizen: citizen.to_string(),
                    limit,
                });
            }
        }

        let number = history.latest() + 1;
        history
            .versions
            .push(ProfileVersion::new(number, profile, submitted_by));
        history.current = number;
        log::debug!("record store: appended version {number} for {citizen}");
        Ok(number)
    }

    /// Move the current pointer to an existing version. No version is
    /// created or removed.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidVersion` if `n` is outside `1..=latest`.
    pub fn set_current_version(&self, citizen: &CitizenId, n: u64) -> Result<()> {
        let mut citizens = self.write()?;
        let Some(history) = citizens.get_mut(citizen) else {
            return Err(invalid_version(citizen, n, 0));
        };
        history.version(n)?;
        history.current = n;
        log::debug!("record store: current version of {citizen} set to {n}");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// Return the full version record `n`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidVersion` if `n` is outside `1..=latest`
    /// (the range is empty for an unregistered citizen).
    pub fn get_version(&self, citizen: &CitizenId, n: u64) -> Result<ProfileVersion> {
        let citizens = self.read()?;
        match citizens.get(citizen) {
            Some(history) => history.version(n).cloned(),
            None => Err(invalid_version(citizen, n, 0)),
        }
    }

    /// Return the payload of version `n`.
    pub fn get_by_version(&self, citizen: &CitizenId, n: u64) -> Result<Profile> {
        self.get_version(citizen, n).map(|v| v.profile)
    }

    /// Return the version record the current pointer references.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NoDataStored` if the citizen is unregistered.
    pub fn get_current_version(&self, citizen: &CitizenId) -> Result<ProfileVersion> {
        let citizens = self.read()?;
        let history = citizens
            .get(citizen)
            .ok_or_else(|| RegistryError::NoDataStored(citizen.to_string()))?;
        history.version(history.current).cloned()
    }

    /// Return the payload at the current pointer.
    pub fn get_current(&self, citizen: &CitizenId) -> Result<Profile> {
        self.get_current_version(citizen).map(|v| v.profile)
    }

    /// Return the current pointer, or `None` if unregistered.
    pub fn current_version(&self, citizen: &CitizenId) -> Result<Option<u64>> {
        Ok(self.read()?.get(citizen).map(|h| h.current))
    }

    /// Return `1..=latest` in ascending order; empty if unregistered.
    pub fn list_versions(&self, citizen: &CitizenId) -> Result<Vec<u64>> {
        let latest = self.read()?.get(citizen).map(|h| h.latest()).unwrap_or(0);
        Ok((1..=latest).collect())
    }

    /// Clone a citizen's history, or `None` if unregistered.
    pub fn history(&self, citizen: &CitizenId) -> Result<Option<CitizenHistory>> {
        Ok(self.read()?.get(citizen).cloned())
    }

    pub fn is_registered(&self, citizen: &CitizenId) -> Result<bool> {
        Ok(self.read()?.contains_key(citizen))
    }

    /// Number of registered citizens.
    pub fn citizen_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Number of versions beyond each citizen's version 1, summed.
    pub fn total_updates(&self) -> Result<u64> {
        Ok(self
            .read()?
            .values()
            .map(|h| h.latest().saturating_sub(1))
            .sum())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<CitizenId, CitizenHistory>>> {
        self.citizens
            .read()
            .map_err(|_| RegistryError::poisoned("record store"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<CitizenId, CitizenHistory>>> {
        self.citizens
            .write()
            .map_err(|_| RegistryError::poisoned("record store"))
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
