//! Error types for the citizen registry.
//!
//! All errors are strongly typed and surfaced to the caller verbatim.
//! Account secrets and their hashes are never included in error messages.

/// Registry error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Citizen not registered: {0}")]
    NotRegistered(String),

    #[error("Citizen already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid version {version} for {citizen}: valid range is 1..={latest}")]
    InvalidVersion {
        citizen: String,
        version: u64,
        latest: u64,
    },

    #[error("No data stored for citizen: {0}")]
    NoDataStored(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error(
        "Staging migration for {citizen} stopped at draft {failed_draft}: \
         {migrated} migrated, {pending} still pending ({reason})"
    )]
    PartialMigration {
        citizen: String,
        failed_draft: u64,
        migrated: usize,
        pending: usize,
        reason: String,
    },

    #[error("Version limit of {limit} reached for citizen: {citizen}")]
    VersionLimitReached { citizen: String, limit: u64 },

    #[error("Agency not found: {0}")]
    AgencyNotFound(u32),

    #[error("Staging draft {draft} not found for {citizen}")]
    DraftNotFound { citizen: String, draft: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid secret")]
    InvalidSecret,

    #[error("Secret derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Build the error reported when a shared lock was poisoned by a
    /// panicking holder.
    pub(crate) fn poisoned(what: &str) -> Self {
        Self::StorageError(format!("{what} lock poisoned"))
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;
