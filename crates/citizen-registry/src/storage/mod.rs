//! Storage layer for registry snapshots and citizen exports.
//!
//! # Directory layout
//!
//! By convention the CLI keeps its state under `~/.citizen-registry/`
//! (overridable with `CREG_HOME`):
//!
//! ```text
//! ~/.citizen-registry/
//! ├── config.json       — RegistryConfig
//! └── registry.json     — full registry snapshot
//! ```
//!
//! # Modules
//!
//! - [`registry_file`]: versioned snapshot save/load.
//! - [`export`]: one citizen's version history as a standalone document.

use std::path::Path;

use crate::error::Result;

pub mod export;
pub mod registry_file;

pub use export::{export_history, read_export, HistoryExport};
pub use registry_file::{load_registry, save_registry, RegistryFile};

/// Write `data` to `path` atomically using a sibling temporary file.
///
/// Creates the parent directory if it does not exist. Readers never see a
/// partially written file.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, data)?;

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
