//! Permission table — per-citizen, per-agency read grants.
//!
//! A grant is a plain boolean. Absence means denied, and a citizen with no
//! permission history is not an error: it reports every known agency as
//! denied. Grants are overwritten unconditionally; the table does not check
//! who is calling, that is enforced by the coordinator.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::agency::AgencyId;
use crate::error::{RegistryError, Result};
use crate::profile::CitizenId;

/// One stored `(citizen, agency) -> granted` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub citizen: CitizenId,
    pub agency: AgencyId,
    pub granted: bool,
}

/// The grant state of one agency for one citizen, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub agency: AgencyId,
    pub granted: bool,
}

/// In-memory permission table.
pub struct PermissionTable {
    entries: RwLock<HashMap<CitizenId, BTreeMap<AgencyId, bool>>>,
}

impl PermissionTable {
    /// Create an empty table (everything denied).
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a table from saved entries. Later entries for the same pair
    /// overwrite earlier ones.
    pub fn from_entries(entries: Vec<PermissionEntry>) -> Self {
        let mut map: HashMap<CitizenId, BTreeMap<AgencyId, bool>> = HashMap::new();
        for e in entries {
            map.entry(e.citizen).or_default().insert(e.agency, e.granted);
        }
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Every stored entry, ordered by citizen then agency.
    pub fn entries(&self) -> Result<Vec<PermissionEntry>> {
        let entries = self.read()?;
        let mut citizens: Vec<&CitizenId> = entries.keys().collect();
        citizens.sort();
        Ok(citizens
            .into_iter()
            .flat_map(|citizen| {
                entries[citizen]
                    .iter()
                    .map(move |(agency, granted)| PermissionEntry {
                        citizen: citizen.clone(),
                        agency: *agency,
                        granted: *granted,
                    })
            })
            .collect())
    }

    /// Set (or overwrite) one grant. Idempotent.
    pub fn set_grant(&self, citizen: &CitizenId, agency: AgencyId, granted: bool) -> Result<()> {
        self.write()?
            .entry(citizen.clone())
            .or_default()
            .insert(agency, granted);
        log::info!(
            "permission table: {} agency {agency} for {citizen}",
            if granted { "granted" } else { "denied" }
        );
        Ok(())
    }

    /// Return `true` only if `agency` holds an explicit `true` grant.
    pub fn is_granted(&self, citizen: &CitizenId, agency: AgencyId) -> Result<bool> {
        Ok(self
            .read()?
            .get(citizen)
            .and_then(|grants| grants.get(&agency))
            .copied()
            .unwrap_or(false))
    }

    /// Report the grant state of every agency in `known_agencies`, in the
    /// order given. Agencies never explicitly granted read as denied.
    pub fn get_grants(&self, citizen: &CitizenId, known_agencies: &[AgencyId]) -> Result<Vec<Grant>> {
        let entries = self.read()?;
        let grants = entries.get(citizen);
        Ok(known_agencies
            .iter()
            .map(|agency| Grant {
                agency: *agency,
                granted: grants
                    .and_then(|g| g.get(agency))
                    .copied()
                    .unwrap_or(false),
            })
            .collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<CitizenId, BTreeMap<AgencyId, bool>>>> {
        self.entries
            .read()
            .map_err(|_| RegistryError::poisoned("permission table"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<CitizenId, BTreeMap<AgencyId, bool>>>> {
        self.entries
            .write()
            .map_err(|_| RegistryError::poisoned("permission table"))
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::new()
    }
}
