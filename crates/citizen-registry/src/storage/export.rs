//! Citizen history export.
//!
//! File format:
//! ```json
//! { "version": 1, "citizen": "...", "current": 3, "versions": [ ... ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::profile::{CitizenId, ProfileVersion};
use crate::records::CitizenHistory;

const EXPORT_FILE_VERSION: u32 = 1;

/// Standalone export of one citizen's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    pub version: u32,
    pub citizen: CitizenId,
    pub current: u64,
    pub versions: Vec<ProfileVersion>,
}

impl From<CitizenHistory> for HistoryExport {
    fn from(history: CitizenHistory) -> Self {
        Self {
            version: EXPORT_FILE_VERSION,
            citizen: history.citizen,
            current: history.current,
            versions: history.versions,
        }
    }
}

/// Write a citizen's history to `path`.
pub fn export_history(history: CitizenHistory, path: &Path) -> Result<()> {
    let citizen = history.citizen.clone();
    let export = HistoryExport::from(history);
    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
    super::write_atomic(path, json.as_bytes())?;
    log::debug!("export: wrote history of {citizen} to {}", path.display());
    Ok(())
}

/// Read an export back, checking the same invariants as a live history.
///
/// # Errors
///
/// Returns `RegistryError::InvalidFileFormat` for malformed files, unknown
/// versions or broken invariants.
pub fn read_export(path: &Path) -> Result<CitizenHistory> {
    let bytes = std::fs::read(path)?;
    let export: HistoryExport = serde_json::from_slice(&bytes).map_err(|e| {
        RegistryError::InvalidFileFormat(format!(
            "failed to parse export {}: {e}",
            path.display()
        ))
    })?;
    if export.version != EXPORT_FILE_VERSION {
        return Err(RegistryError::InvalidFileFormat(format!(
            "unsupported export version {}",
            export.version
        )));
    }
    let history = CitizenHistory {
        citizen: export.citizen,
        current: export.current,
        versions: export.versions,
    };
    history.validate()?;
    Ok(history)
}
