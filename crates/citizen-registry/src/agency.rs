//! Agency directory — the fixed registry of organizations.
//!
//! Agencies are numbered sequentially from 1 in registration order. The
//! permission table enumerates this directory when it reports a citizen's
//! grants, so an agency that was never granted anything still appears (as
//! denied).

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::secret;

/// Sequential agency identifier, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgencyId(pub u32);

impl std::fmt::Display for AgencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AgencyId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let n: u32 = s
            .trim()
            .parse()
            .map_err(|_| RegistryError::InvalidInput(format!("invalid agency id: {s}")))?;
        if n == 0 {
            return Err(RegistryError::InvalidInput("agency ids start at 1".into()));
        }
        Ok(Self(n))
    }
}

/// A registered organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    pub id: AgencyId,
    pub name: String,
    pub contact: String,
    /// Argon2id digest of the agency's login secret.
    pub secret_hash: String,
    /// Registration timestamp (microseconds since epoch).
    pub registered_at: u64,
}

/// In-memory directory of agencies, keyed by id.
pub struct AgencyDirectory {
    agencies: RwLock<BTreeMap<AgencyId, Agency>>,
}

impl AgencyDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            agencies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Rebuild a directory from saved agencies.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` unless ids run 1..=n with
    /// no gaps or duplicates.
    pub fn from_agencies(agencies: Vec<Agency>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for agency in agencies {
            let id = agency.id;
            if map.insert(id, agency).is_some() {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "duplicate agency id {id}"
                )));
            }
        }
        for (i, id) in map.keys().enumerate() {
            if id.0 as usize != i + 1 {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "agency ids are not contiguous at {id}"
                )));
            }
        }
        Ok(Self {
            agencies: RwLock::new(map),
        })
    }

    /// Register a new agency and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidInput` for an empty name or secret.
    pub fn register(&self, name: &str, contact: &str, secret: &str) -> Result<AgencyId> {
        let name = validate_name(name)?;
        let secret_hash = secret::hash_secret(secret)?;

        let mut agencies = self.write()?;
        let id = AgencyId(agencies.len() as u32 + 1);
        agencies.insert(
            id,
            Agency {
                id,
                name: name.clone(),
                contact: contact.trim().to_string(),
                secret_hash,
                registered_at: crate::time::now_micros(),
            },
        );
        log::info!("agency directory: registered agency {id} ({name})");
        Ok(id)
    }

    /// Overwrite an agency's name, contact and secret.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AgencyNotFound` for an unknown id, or
    /// `RegistryError::InvalidInput` for an empty name or secret.
    pub fn update(&self, id: AgencyId, name: &str, contact: &str, secret: &str) -> Result<()> {
        let name = validate_name(name)?;
        let secret_hash = secret::hash_secret(secret)?;

        let mut agencies = self.write()?;
        let agency = agencies
            .get_mut(&id)
            .ok_or(RegistryError::AgencyNotFound(id.0))?;
        agency.name = name;
        agency.contact = contact.trim().to_string();
        agency.secret_hash = secret_hash;
        log::info!("agency directory: updated agency {id}");
        Ok(())
    }

    pub fn get(&self, id: AgencyId) -> Result<Agency> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(RegistryError::AgencyNotFound(id.0))
    }

    pub fn contains(&self, id: AgencyId) -> Result<bool> {
        Ok(self.read()?.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// All agencies in ascending id order.
    pub fn list(&self) -> Result<Vec<Agency>> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// All agency ids in ascending order.
    pub fn ids(&self) -> Result<Vec<AgencyId>> {
        Ok(self.read()?.keys().copied().collect())
    }

    /// Check an agency's login secret.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AgencyNotFound` for an unknown id or
    /// `RegistryError::InvalidSecret` on mismatch.
    pub fn authenticate(&self, id: AgencyId, secret: &str) -> Result<()> {
        let agency = self.get(id)?;
        if secret::verify_secret(secret, &agency.secret_hash) {
            Ok(())
        } else {
            Err(RegistryError::InvalidSecret)
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<AgencyId, Agency>>> {
        self.agencies
            .read()
            .map_err(|_| RegistryError::poisoned("agency directory"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<AgencyId, Agency>>> {
        self.agencies
            .write()
            .map_err(|_| RegistryError::poisoned("agency directory"))
    }
}

impl Default for AgencyDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistryError::InvalidInput("agency name must not be empty".into()));
    }
    Ok(name.to_string())
}
