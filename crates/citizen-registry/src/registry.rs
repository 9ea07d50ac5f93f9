//! Registry coordinator — the write path and the only owner of cross-component
//! sequences.
//!
//! Every write for a citizen runs under that citizen's lock, so the
//! "is registered?" check and the append or stage that follows it cannot
//! interleave with a registration. Reads of one citizen's versions or drafts
//! take the same lock and never observe a migration half done. Reads go
//! through [`AccessGateway`].

use serde::{Deserialize, Serialize};

use crate::agency::{Agency, AgencyDirectory, AgencyId};
use crate::caller::Caller;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::gateway::{AccessGateway, VersionSummary};
use crate::locks::KeyedLocks;
use crate::permissions::{Grant, PermissionEntry, PermissionTable};
use crate::profile::{AccountInfo, CitizenId, Profile, ProfileSection};
use crate::records::{CitizenHistory, RecordStore};
use crate::staging::{StagedQueue, StagingArea, StagingDraft};

// ── Result types ─────────────────────────────────────────────────────────────

/// Where a write landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum Submission {
    /// Appended to the record store as this version.
    Appended(u64),
    /// Queued in the staging area as this draft.
    Staged(u64),
}

/// One row of a bulk submission: the citizen identifier next to the flat
/// profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRow {
    pub citizen: CitizenId,
    #[serde(flatten)]
    pub profile: Profile,
}

/// A staged draft that became a committed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigratedDraft {
    pub draft: u64,
    pub version: u64,
}

/// Why a migration stopped before the last draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMigration {
    pub failed_draft: u64,
    /// Drafts still staged, including the failed one.
    pub pending: Vec<u64>,
    pub reason: String,
}

/// Outcome of draining a citizen's staged drafts into the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub citizen: CitizenId,
    pub migrated: Vec<MigratedDraft>,
    pub partial: Option<PartialMigration>,
}

impl MigrationReport {
    pub fn is_complete(&self) -> bool {
        self.partial.is_none()
    }

    /// Turn an incomplete migration into `RegistryError::PartialMigration`.
    pub fn into_result(self) -> Result<Vec<MigratedDraft>> {
        match self.partial {
            None => Ok(self.migrated),
            Some(p) => Err(RegistryError::PartialMigration {
                citizen: self.citizen.to_string(),
                failed_draft: p.failed_draft,
                migrated: self.migrated.len(),
                pending: p.pending.len(),
                reason: p.reason,
            }),
        }
    }
}

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReport {
    /// Always 1.
    pub version: u64,
    pub migration: MigrationReport,
}

impl RegistrationReport {
    /// Registration succeeded; fail only if the migration stopped early.
    pub fn into_result(self) -> Result<Vec<MigratedDraft>> {
        self.migration.into_result()
    }
}

/// Permission-free summary used to choose between append and stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenDetails {
    pub citizen: CitizenId,
    pub registered: bool,
    pub current_version: Option<u64>,
    pub versions: Vec<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_citizens: usize,
    pub total_agencies: usize,
    /// Versions beyond each citizen's version 1.
    pub total_updates: u64,
    pub pending_drafts: usize,
}

/// The complete persisted state of a registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryState {
    pub agencies: Vec<Agency>,
    pub citizens: Vec<CitizenHistory>,
    pub permissions: Vec<PermissionEntry>,
    pub staging: Vec<StagedQueue>,
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// The citizen registry.
pub struct Registry {
    config: RegistryConfig,
    records: RecordStore,
    permissions: PermissionTable,
    staging: StagingArea,
    agencies: AgencyDirectory,
    locks: KeyedLocks,
}

impl Registry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            records: RecordStore::with_version_limit(config.max_versions_per_citizen),
            permissions: PermissionTable::new(),
            staging: StagingArea::new(),
            agencies: AgencyDirectory::new(),
            locks: KeyedLocks::new(),
            config,
        }
    }

    /// Rebuild a registry from saved state.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` if any component's
    /// invariants do not hold, or a grant names an unknown agency.
    pub fn from_state(config: RegistryConfig, state: RegistryState) -> Result<Self> {
        let agencies = AgencyDirectory::from_agencies(state.agencies)?;
        for entry in &state.permissions {
            if !agencies.contains(entry.agency)? {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "grant for {} names unknown agency {}",
                    entry.citizen, entry.agency
                )));
            }
        }
        Ok(Self {
            records: RecordStore::from_histories(
                state.citizens,
                config.max_versions_per_citizen,
            )?,
            permissions: PermissionTable::from_entries(state.permissions),
            staging: StagingArea::from_queues(state.staging)?,
            agencies,
            locks: KeyedLocks::new(),
            config,
        })
    }

    /// Capture the current state for persistence.
    pub fn snapshot(&self) -> Result<RegistryState> {
        Ok(RegistryState {
            agencies: self.agencies.list()?,
            citizens: self.records.histories()?,
            permissions: self.permissions.entries()?,
            staging: self.staging.queues()?,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn gateway(&self) -> AccessGateway<'_> {
        AccessGateway::new(&self.records, &self.permissions)
    }

    /// Agency-supplied data never carries an account secret.
    fn without_account(mut profile: Profile) -> Profile {
        profile.account = AccountInfo::default();
        profile
    }

    // ── Registration & migration ─────────────────────────────────────────────

    /// Register a citizen with `profile` as version 1, then migrate any staged
    /// drafts in ascending order.
    ///
    /// A migration that stops early is not an error here: the report carries
    /// the failed draft and the drafts left pending. Use
    /// [`RegistrationReport::into_result`] for strict handling.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AccessDenied` unless the caller is the citizen
    /// or the administrator, or `RegistryError::AlreadyRegistered`.
    pub fn register_citizen(
        &self,
        caller: &Caller,
        citizen: &CitizenId,
        profile: Profile,
    ) -> Result<RegistrationReport> {
        if !caller.is_citizen(citizen) && !caller.is_administrator() {
            return Err(RegistryError::AccessDenied(format!(
                "{caller} may not register {citizen}"
            )));
        }
        self.locks.with_citizen(citizen, || {
            let version = self.records.register(citizen, profile)?;
            log::info!("registry: registered citizen {citizen}");
            let migration = self.migrate_drafts(citizen)?;
            Ok(RegistrationReport { version, migration })
        })
    }

    /// Retry migrating drafts left pending by an earlier partial migration.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AccessDenied` unless the caller is the citizen
    /// or the administrator, or `RegistryError::NotRegistered`.
    pub fn resume_migration(&self, caller: &Caller, citizen: &CitizenId) -> Result<MigrationReport> {
        if !caller.is_citizen(citizen) && !caller.is_administrator() {
            return Err(RegistryError::AccessDenied(format!(
                "{caller} may not migrate drafts for {citizen}"
            )));
        }
        self.locks.with_citizen(citizen, || {
            if !self.records.is_registered(citizen)? {
                return Err(RegistryError::NotRegistered(citizen.to_string()));
            }
            self.migrate_drafts(citizen)
        })
    }

    /// Append each staged draft in order, stopping at the first failure.
    /// Caller must hold the citizen lock.
    fn migrate_drafts(&self, citizen: &CitizenId) -> Result<MigrationReport> {
        let drafts = self.staging.drafts(citizen)?;
        let mut migrated = Vec::with_capacity(drafts.len());
        let mut partial = None;

        for (i, draft) in drafts.iter().enumerate() {
            let profile = Self::without_account(draft.profile.clone());
            match self.records.append(citizen, profile, &draft.organization) {
                Ok(version) => migrated.push(MigratedDraft {
                    draft: draft.number,
                    version,
                }),
                Err(e) => {
                    partial = Some(PartialMigration {
                        failed_draft: draft.number,
                        pending: drafts[i..].iter().map(|d| d.number).collect(),
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        match (&partial, migrated.last()) {
            (None, _) => {
                self.staging.clear(citizen)?;
            }
            (Some(_), Some(last)) => {
                self.staging.remove_through(citizen, last.draft)?;
            }
            (Some(_), None) => {}
        }

        if let Some(p) = &partial {
            log::warn!(
                "registry: migration for {citizen} stopped at draft {} ({} migrated, {} pending): {}",
                p.failed_draft,
                migrated.len(),
                p.pending.len(),
                p.reason
            );
        } else if !migrated.is_empty() {
            log::info!(
                "registry: migrated {} staged drafts for {citizen}",
                migrated.len()
            );
        }

        Ok(MigrationReport {
            citizen: citizen.clone(),
            migrated,
            partial,
        })
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    /// Submit a full profile.
    ///
    /// A citizen appends to their own record. An organization appends if the
    /// citizen is registered and stages a draft otherwise; no read grant is
    /// needed to write. An organization's account section is dropped.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotRegistered` for a self-submission before
    /// registration, `RegistryError::AgencyNotFound` for an unknown
    /// organization, or `RegistryError::AccessDenied` for anyone else.
    pub fn submit(&self, caller: &Caller, citizen: &CitizenId, profile: Profile) -> Result<Submission> {
        match caller {
            Caller::Citizen(c) if c == citizen => self.locks.with_citizen(citizen, || {
                self.records
                    .append(citizen, profile, "")
                    .map(Submission::Appended)
            }),
            Caller::Organization(id) => {
                let agency = self.agencies.get(*id)?;
                let profile = Self::without_account(profile);
                self.locks.with_citizen(citizen, || {
                    if self.records.is_registered(citizen)? {
                        self.records
                            .append(citizen, profile, &agency.name)
                            .map(Submission::Appended)
                    } else {
                        self.staging
                            .stage(citizen, profile, &agency.name)
                            .map(Submission::Staged)
                    }
                })
            }
            _ => Err(RegistryError::AccessDenied(format!(
                "{caller} may not submit data for {citizen}"
            ))),
        }
    }

    /// Submit each row in order. A failing row does not stop the rest.
    pub fn submit_bulk(&self, caller: &Caller, rows: Vec<BulkRow>) -> Vec<Result<Submission>> {
        let results: Vec<Result<Submission>> = rows
            .into_iter()
            .map(|row| self.submit(caller, &row.citizen, row.profile))
            .collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        log::info!(
            "registry: bulk submission by {caller}: {} rows, {failed} failed",
            results.len()
        );
        results
    }

    /// Replace one sub-group and re-submit the union as a full record.
    ///
    /// For a registered citizen the base is the current version. For an
    /// unregistered citizen (organizations only) the base is the newest
    /// staged draft, or an empty profile. Organizations write no account
    /// secret.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AccessDenied` for an organization's account
    /// section or a caller other than the citizen and organizations.
    pub fn update_section(
        &self,
        caller: &Caller,
        citizen: &CitizenId,
        section: ProfileSection,
    ) -> Result<Submission> {
        let submitter = match caller {
            Caller::Citizen(c) if c == citizen => String::new(),
            Caller::Organization(_) if matches!(section, ProfileSection::Account(_)) => {
                return Err(RegistryError::AccessDenied(format!(
                    "{caller} may not change the account of {citizen}"
                )))
            }
            Caller::Organization(id) => self.agencies.get(*id)?.name,
            _ => {
                return Err(RegistryError::AccessDenied(format!(
                    "{caller} may not update {citizen}"
                )))
            }
        };
        let tag = section.as_tag();
        let by_agency = matches!(caller, Caller::Organization(_));
        let result = self.locks.with_citizen(citizen, || {
            if self.records.is_registered(citizen)? {
                let mut next = self.records.get_current(citizen)?.with_section(section);
                if by_agency {
                    next = Self::without_account(next);
                }
                self.records
                    .append(citizen, next, &submitter)
                    .map(Submission::Appended)
            } else if by_agency {
                let base = self
                    .staging
                    .drafts(citizen)?
                    .pop()
                    .map(|d| d.profile)
                    .unwrap_or_default();
                let next = Self::without_account(base.with_section(section));
                self.staging
                    .stage(citizen, next, &submitter)
                    .map(Submission::Staged)
            } else {
                Err(RegistryError::NotRegistered(citizen.to_string()))
            }
        })?;
        log::debug!("registry: {caller} updated {tag} section of {citizen}: {result:?}");
        Ok(result)
    }

    /// Make version `n` authoritative again.
    ///
    /// Moves the pointer to `n`, then appends a copy of it carrying the
    /// account secret of the previously current version, so the history grows
    /// instead of rewinding. Returns the new version number. If the append
    /// fails the pointer is put back.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AccessDenied` unless the caller is the citizen,
    /// `RegistryError::NotRegistered`, `RegistryError::InvalidVersion`, or the
    /// append's error.
    pub fn apply_version(&self, caller: &Caller, citizen: &CitizenId, n: u64) -> Result<u64> {
        if !caller.is_citizen(citizen) {
            return Err(RegistryError::AccessDenied(format!(
                "{caller} may not apply versions for {citizen}"
            )));
        }
        self.locks.with_citizen(citizen, || {
            if !self.records.is_registered(citizen)? {
                return Err(RegistryError::NotRegistered(citizen.to_string()));
            }
            let previous = self.records.get_current_version(citizen)?;
            let target = self.records.get_version(citizen, n)?;
            self.records.set_current_version(citizen, n)?;

            let mut profile = target.profile;
            profile.account = previous.profile.account;
            match self.records.append(citizen, profile, "") {
                Ok(version) => {
                    log::info!("registry: {citizen} applied version {n} as version {version}");
                    Ok(version)
                }
                Err(e) => {
                    if let Err(restore) = self.records.set_current_version(citizen, previous.number)
                    {
                        log::warn!("registry: could not restore pointer for {citizen}: {restore}");
                    }
                    Err(e)
                }
            }
        })
    }

    // ── Grants ───────────────────────────────────────────────────────────────

    /// Grant or revoke an agency's read access. Only the citizen may do this.
    pub fn set_grant(
        &self,
        caller: &Caller,
        citizen: &CitizenId,
        agency: AgencyId,
        granted: bool,
    ) -> Result<()> {
        if !caller.is_citizen(citizen) {
            return Err(RegistryError::AccessDenied(format!(
                "{caller} may not change grants for {citizen}"
            )));
        }
        if !self.agencies.contains(agency)? {
            return Err(RegistryError::AgencyNotFound(agency.0));
        }
        self.locks.with_citizen(citizen, || {
            if !self.records.is_registered(citizen)? {
                return Err(RegistryError::NotRegistered(citizen.to_string()));
            }
            self.permissions.set_grant(citizen, agency, granted)
        })
    }

    /// Grant state of every known agency for `citizen`, ascending by id.
    pub fn grants(&self, citizen: &CitizenId) -> Result<Vec<Grant>> {
        let ids = self.agencies.ids()?;
        self.permissions.get_grants(citizen, &ids)
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn read_current(&self, caller: &Caller, citizen: &CitizenId) -> Result<Profile> {
        self.locks
            .with_citizen(citizen, || self.gateway().read_current(caller, citizen))
    }

    pub fn read_version(&self, caller: &Caller, citizen: &CitizenId, n: u64) -> Result<Profile> {
        self.locks
            .with_citizen(citizen, || self.gateway().read_version(caller, citizen, n))
    }

    pub fn list_versions(&self, caller: &Caller, citizen: &CitizenId) -> Result<Vec<u64>> {
        self.locks
            .with_citizen(citizen, || self.gateway().list_versions(caller, citizen))
    }

    pub fn history(&self, caller: &Caller, citizen: &CitizenId) -> Result<Vec<VersionSummary>> {
        self.locks
            .with_citizen(citizen, || self.gateway().history(caller, citizen))
    }

    /// Full version history for export, under the read permission rule.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AccessDenied` or `RegistryError::NoDataStored`.
    pub fn export_history(&self, caller: &Caller, citizen: &CitizenId) -> Result<CitizenHistory> {
        self.locks.with_citizen(citizen, || {
            self.gateway().authorize(caller, citizen)?;
            self.records
                .history(citizen)?
                .ok_or_else(|| RegistryError::NoDataStored(citizen.to_string()))
        })
    }

    /// Registration status, current pointer and version numbers.
    pub fn citizen_details(&self, citizen: &CitizenId) -> Result<CitizenDetails> {
        self.locks.with_citizen(citizen, || {
            let current_version = self.records.current_version(citizen)?;
            Ok(CitizenDetails {
                citizen: citizen.clone(),
                registered: current_version.is_some(),
                current_version,
                versions: self.records.list_versions(citizen)?,
            })
        })
    }

    /// Staged drafts for `citizen`. Administrator or the citizen only.
    pub fn pending_drafts(&self, caller: &Caller, citizen: &CitizenId) -> Result<Vec<StagingDraft>> {
        if !caller.is_citizen(citizen) && !caller.is_administrator() {
            return Err(RegistryError::AccessDenied(format!(
                "{caller} may not inspect drafts for {citizen}"
            )));
        }
        self.locks
            .with_citizen(citizen, || self.staging.drafts(citizen))
    }

    // ── Agencies ─────────────────────────────────────────────────────────────

    fn require_admin(caller: &Caller, action: &str) -> Result<()> {
        if caller.is_administrator() {
            Ok(())
        } else {
            Err(RegistryError::AccessDenied(format!("{caller} may not {action}")))
        }
    }

    /// Register an organization. Administrator only.
    pub fn register_agency(
        &self,
        caller: &Caller,
        name: &str,
        contact: &str,
        secret: &str,
    ) -> Result<AgencyId> {
        Self::require_admin(caller, "register agencies")?;
        self.agencies.register(name, contact, secret)
    }

    /// Overwrite an organization's details. Administrator only.
    pub fn update_agency(
        &self,
        caller: &Caller,
        id: AgencyId,
        name: &str,
        contact: &str,
        secret: &str,
    ) -> Result<()> {
        Self::require_admin(caller, "update agencies")?;
        self.agencies.update(id, name, contact, secret)
    }

    pub fn agency(&self, id: AgencyId) -> Result<Agency> {
        self.agencies.get(id)
    }

    pub fn agencies(&self) -> Result<Vec<Agency>> {
        self.agencies.list()
    }

    // ── Authentication ───────────────────────────────────────────────────────

    /// Verify a citizen's secret against the current version's account
    /// secret, falling back to the newest earlier version that has one
    /// (agency-submitted versions usually carry none).
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotRegistered` or `RegistryError::InvalidSecret`.
    pub fn login_citizen(&self, citizen: &CitizenId, secret: &str) -> Result<Caller> {
        let history = self
            .locks
            .with_citizen(citizen, || self.records.history(citizen))?
            .ok_or_else(|| RegistryError::NotRegistered(citizen.to_string()))?;
        let stored = history
            .versions
            .iter()
            .take(history.current as usize)
            .rev()
            .map(|v| v.profile.account.password_hash.as_str())
            .find(|h| !h.is_empty())
            .unwrap_or("");
        if crate::secret::verify_secret(secret, stored) {
            log::info!("registry: citizen {citizen} logged in");
            Ok(Caller::Citizen(citizen.clone()))
        } else {
            Err(RegistryError::InvalidSecret)
        }
    }

    pub fn login_agency(&self, id: AgencyId, secret: &str) -> Result<Caller> {
        self.agencies.authenticate(id, secret)?;
        log::info!("registry: agency {id} logged in");
        Ok(Caller::Organization(id))
    }

    pub fn login_admin(&self, username: &str, secret: &str) -> Result<Caller> {
        if self.config.admin.verify(username, secret) {
            log::info!("registry: administrator logged in");
            Ok(Caller::Administrator)
        } else {
            Err(RegistryError::InvalidSecret)
        }
    }

    // ── Statistics ───────────────────────────────────────────────────────────

    pub fn stats(&self) -> Result<RegistryStats> {
        Ok(RegistryStats {
            total_citizens: self.records.citizen_count()?,
            total_agencies: self.agencies.count()?,
            total_updates: self.records.total_updates()?,
            pending_drafts: self.staging.pending_count()?,
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
