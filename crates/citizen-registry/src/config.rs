//! Registry configuration.
//!
//! Stored as JSON next to the registry snapshot:
//!
//! ```json
//! {
//!   "max_versions_per_citizen": null,
//!   "admin": { "username": "admin", "secret_hash": "" }
//! }
//! ```
//!
//! A missing file means defaults. An empty `secret_hash` disables the
//! administrator login.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::secret;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Credentials for the administrator role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminCredentials {
    pub username: String,
    /// Argon2id digest; empty means no administrator login.
    pub secret_hash: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            secret_hash: String::new(),
        }
    }
}

impl AdminCredentials {
    /// Build credentials from a plaintext secret.
    pub fn new(username: &str, secret: &str) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RegistryError::InvalidInput(
                "admin username must not be empty".into(),
            ));
        }
        Ok(Self {
            username: username.to_string(),
            secret_hash: secret::hash_secret(secret)?,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.secret_hash.is_empty()
    }

    /// Check a login attempt against these credentials.
    pub fn verify(&self, username: &str, secret: &str) -> bool {
        self.is_enabled()
            && self.username == username.trim()
            && secret::verify_secret(secret, &self.secret_hash)
    }
}

/// Tunables for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Cap on the number of versions any one citizen may hold.
    pub max_versions_per_citizen: Option<u64>,
    pub admin: AdminCredentials,
}

impl RegistryConfig {
    /// Load configuration from `path`, or defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` for malformed JSON, or
    /// `RegistryError::Io` for other filesystem errors.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes).map_err(|e| {
            RegistryError::InvalidFileFormat(format!(
                "failed to parse config {}: {e}",
                path.display()
            ))
        })?;
        if config.max_versions_per_citizen == Some(0) {
            return Err(RegistryError::InvalidFileFormat(
                "max_versions_per_citizen must be at least 1".into(),
            ));
        }
        Ok(config)
    }

    /// Write configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
        crate::storage::write_atomic(path, json.as_bytes())
    }
}
