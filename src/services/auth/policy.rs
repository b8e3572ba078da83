//! Role -> operation -> access level policy.
//!
//! Loaded once at startup from a TOML file and shared read-only afterwards:
//!
//! ```toml
//! [roles.public]
//! "*" = "vo"
//!
//! [roles.lcgadmin]
//! config = "all"
//! ```
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role whose permissions every caller gets, authenticated roles or not.
pub const PUBLIC_ROLE: &str = "public";

/// How far an identity may reach for a given operation.
///
/// Variants are ordered by increasing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AccessLevel {
    None,
    /// Only resources owned by the identity itself.
    Private,
    /// Resources belonging to one of the identity's VOs.
    Vo,
    /// Any resource.
    All,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::Private => "private",
            AccessLevel::Vo => "vo",
            AccessLevel::All => "all",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown access level {0:?} (expected none, private, vo or all)")]
pub struct UnknownAccessLevel(pub String);

impl FromStr for AccessLevel {
    type Err = UnknownAccessLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(AccessLevel::None),
            "private" => Ok(AccessLevel::Private),
            "vo" => Ok(AccessLevel::Vo),
            "all" => Ok(AccessLevel::All),
            _ => Err(UnknownAccessLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for AccessLevel {
    type Error = UnknownAccessLevel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Operation (or `*`) -> granted level, for a single role.
pub type RolePermissions = BTreeMap<String, AccessLevel>;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    roles: BTreeMap<String, RolePermissions>,
}

impl Policy {
    pub fn new(roles: BTreeMap<String, RolePermissions>) -> Self {
        Self { roles }
    }

    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| PolicyError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a policy from TOML text, as found in the roles file.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn permissions_for(&self, role: &str) -> Option<&RolePermissions> {
        self.roles.get(role)
    }

    pub fn public(&self) -> Option<&RolePermissions> {
        self.permissions_for(PUBLIC_ROLE)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<R, P> FromIterator<(R, P)> for Policy
where
    R: Into<String>,
    P: IntoIterator<Item = (&'static str, AccessLevel)>,
{
    fn from_iter<T: IntoIterator<Item = (R, P)>>(iter: T) -> Self {
        let roles = iter
            .into_iter()
            .map(|(role, permissions)| {
                let permissions = permissions
                    .into_iter()
                    .map(|(operation, level)| (operation.to_string(), level))
                    .collect();
                (role.into(), permissions)
            })
            .collect();
        Self::new(roles)
    }
}
