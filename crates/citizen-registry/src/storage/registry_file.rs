//! Registry snapshot persistence.
//!
//! The whole registry is saved as one JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "format": "creg-v1",
//!   "saved_at": 1700000000000000,
//!   "state": { "agencies": [...], "citizens": [...], "permissions": [...], "staging": [...] }
//! }
//! ```
//!
//! Loading re-validates every component invariant, so a hand-edited file
//! with a gap in a version run or a dangling pointer is rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::registry::{Registry, RegistryState};

// ── File format constants ─────────────────────────────────────────────────────

const REGISTRY_FILE_VERSION: u32 = 1;
const REGISTRY_FILE_FORMAT: &str = "creg-v1";

/// On-disk snapshot wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistryFile {
    /// Format version number.
    pub version: u32,
    /// Format tag.
    pub format: String,
    /// Save timestamp (microseconds since epoch).
    #[serde(default)]
    pub saved_at: u64,
    pub state: RegistryState,
}

/// Save a registry snapshot to `path` atomically.
///
/// # Errors
///
/// Returns `RegistryError::SerializationError` if serialization fails, or
/// `RegistryError::Io` for filesystem errors.
pub fn save_registry(registry: &Registry, path: &Path) -> Result<()> {
    let file = RegistryFile {
        version: REGISTRY_FILE_VERSION,
        format: REGISTRY_FILE_FORMAT.to_string(),
        saved_at: crate::time::now_micros(),
        state: registry.snapshot()?,
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
    super::write_atomic(path, json.as_bytes())?;
    log::debug!("registry file: saved {}", path.display());
    Ok(())
}

/// Load a registry from `path`. A missing file yields an empty registry.
///
/// # Errors
///
/// Returns `RegistryError::InvalidFileFormat` for malformed files, unknown
/// format versions or broken invariants, or `RegistryError::Io` for
/// filesystem errors.
pub fn load_registry(path: &Path, config: RegistryConfig) -> Result<Registry> {
    if !path.exists() {
        log::debug!("registry file: {} not found, starting empty", path.display());
        return Ok(Registry::new(config));
    }

    let bytes = std::fs::read(path)?;
    let file: RegistryFile = serde_json::from_slice(&bytes).map_err(|e| {
        RegistryError::InvalidFileFormat(format!(
            "failed to parse registry file {}: {e}",
            path.display()
        ))
    })?;

    if file.version != REGISTRY_FILE_VERSION || file.format != REGISTRY_FILE_FORMAT {
        return Err(RegistryError::InvalidFileFormat(format!(
            "unsupported registry file {} v{} (expected {REGISTRY_FILE_FORMAT} v{REGISTRY_FILE_VERSION})",
            file.format, file.version
        )));
    }

    Registry::from_state(config, file.state)
}
