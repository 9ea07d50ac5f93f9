//! Caller roles.
//!
//! The registry never authenticates a request itself; it receives an
//! already-identified [`Caller`] and decides what that role may do.

use serde::{Deserialize, Serialize};

use crate::agency::AgencyId;
use crate::error::{RegistryError, Result};
use crate::profile::CitizenId;

/// The role a request is made under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Caller {
    /// A citizen acting on their own record.
    Citizen(CitizenId),
    /// A registered organization.
    Organization(AgencyId),
    /// The administrator (break-glass reads, agency management).
    Administrator,
}

impl Caller {
    /// Return `true` if this caller is the citizen `citizen`.
    pub fn is_citizen(&self, citizen: &CitizenId) -> bool {
        matches!(self, Self::Citizen(c) if c == citizen)
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Citizen(c) => write!(f, "citizen:{c}"),
            Self::Organization(a) => write!(f, "agency:{a}"),
            Self::Administrator => write!(f, "admin"),
        }
    }
}

/// Parses `citizen:<ID>`, `agency:<N>` or `admin`.
impl std::str::FromStr for Caller {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("admin") {
            return Ok(Self::Administrator);
        }
        match s.split_once(':') {
            Some(("citizen", id)) => Ok(Self::Citizen(CitizenId::new(id)?)),
            Some(("agency", id)) => Ok(Self::Organization(id.parse()?)),
            _ => Err(RegistryError::InvalidInput(format!(
                "unknown caller {s:?}; expected citizen:<ID>, agency:<N> or admin"
            ))),
        }
    }
}
