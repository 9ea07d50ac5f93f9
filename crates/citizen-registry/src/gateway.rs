//! Access gateway — the single read path for profile data.
//!
//! Every read re-evaluates the caller against the permission table; nothing
//! is cached. A citizen may always read their own record, an organization
//! needs an explicit grant, and the administrator is always allowed.

use serde::{Deserialize, Serialize};

use crate::caller::Caller;
use crate::error::{RegistryError, Result};
use crate::permissions::PermissionTable;
use crate::profile::{CitizenId, Profile};
use crate::records::RecordStore;

/// Metadata of one version, without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub number: u64,
    /// Submitting organization name, empty for self-service.
    pub submitted_by: String,
    pub created_at: u64,
    pub is_current: bool,
}

/// Borrowed view over the record store and permission table.
pub struct AccessGateway<'a> {
    records: &'a RecordStore,
    permissions: &'a PermissionTable,
}

impl<'a> AccessGateway<'a> {
    pub fn new(records: &'a RecordStore, permissions: &'a PermissionTable) -> Self {
        Self {
            records,
            permissions,
        }
    }

    /// Decide whether `caller` may read `citizen`'s data.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AccessDenied` for an organization without a
    /// grant or a citizen reading someone else's record.
    pub fn authorize(&self, caller: &Caller, citizen: &CitizenId) -> Result<()> {
        let allowed = match caller {
            Caller::Citizen(c) => c == citizen,
            Caller::Organization(agency) => self.permissions.is_granted(citizen, *agency)?,
            Caller::Administrator => {
                log::debug!("gateway: administrator read of {citizen}");
                true
            }
        };
        if allowed {
            Ok(())
        } else {
            Err(RegistryError::AccessDenied(format!(
                "{caller} may not read {citizen}"
            )))
        }
    }

    /// Read the payload at the current pointer.
    pub fn read_current(&self, caller: &Caller, citizen: &CitizenId) -> Result<Profile> {
        self.authorize(caller, citizen)?;
        log::debug!("gateway: {caller} read current of {citizen}");
        self.records.get_current(citizen)
    }

    /// Read the payload of version `n`.
    pub fn read_version(&self, caller: &Caller, citizen: &CitizenId, n: u64) -> Result<Profile> {
        self.authorize(caller, citizen)?;
        log::debug!("gateway: {caller} read version {n} of {citizen}");
        self.records.get_by_version(citizen, n)
    }

    pub fn list_versions(&self, caller: &Caller, citizen: &CitizenId) -> Result<Vec<u64>> {
        self.authorize(caller, citizen)?;
        self.records.list_versions(citizen)
    }

    /// Summaries of every version in ascending order; empty if unregistered.
    pub fn history(&self, caller: &Caller, citizen: &CitizenId) -> Result<Vec<VersionSummary>> {
        self.authorize(caller, citizen)?;
        let Some(history) = self.records.history(citizen)? else {
            return Ok(Vec::new());
        };
        Ok(history
            .versions
            .iter()
            .map(|v| VersionSummary {
                number: v.number,
                submitted_by: v.submitted_by.clone(),
                created_at: v.created_at,
                is_current: v.number == history.current,
            })
            .collect())
    }
}
