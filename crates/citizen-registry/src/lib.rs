//! Citizen registry — versioned citizen profiles with per-agency access
//! grants.
//!
//! Stores each citizen's profile as an append-only run of immutable
//! versions with a movable current pointer, gates reads per requesting
//! organization, and holds data submitted before registration in a staging
//! area that is drained into the record store when the citizen registers.

pub mod agency;
pub mod caller;
pub mod config;
pub mod error;
pub mod gateway;
pub mod locks;
pub mod permissions;
pub mod profile;
pub mod records;
pub mod registry;
pub mod secret;
pub mod staging;
pub mod storage;
pub mod time;

// Re-export primary types
pub use agency::{Agency, AgencyDirectory, AgencyId};
pub use caller::Caller;
pub use config::{AdminCredentials, RegistryConfig};
pub use error::{RegistryError, Result};
pub use gateway::{AccessGateway, VersionSummary};
pub use permissions::{Grant, PermissionEntry, PermissionTable};
pub use records::{CitizenHistory, RecordStore};
pub use registry::{
    BulkRow, CitizenDetails, MigratedDraft, MigrationReport, PartialMigration,
    RegistrationReport, Registry, RegistryState, RegistryStats, Submission,
};
pub use staging::{StagingArea, StagingDraft};

// Re-export profile types
pub use profile::{
    AccountInfo, AddressInfo, CitizenId, CommitmentInfo, EducationInfo, EmploymentInfo,
    HouseholdInfo, IncomeInfo, PersonalInfo, Profile, ProfileSection, ProfileVersion, ReliefInfo,
};
