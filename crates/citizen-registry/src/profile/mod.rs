//! Citizen profiles — payload sub-groups, section updates and immutable
//! versions.
//!
//! The profile module provides:
//! - The flat, UI-compatible payload ([`Profile`]) and its sub-groups
//! - Single sub-group updates ([`ProfileSection`])
//! - Immutable, digest-stamped versions ([`ProfileVersion`])

pub mod section;
pub mod types;
pub mod version;

pub use section::ProfileSection;
pub use types::{
    AccountInfo, AddressInfo, CitizenId, CommitmentInfo, EducationInfo, EmploymentInfo,
    HouseholdInfo, IncomeInfo, PersonalInfo, Profile, ReliefInfo,
};
pub use version::ProfileVersion;
