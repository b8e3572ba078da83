//! Authorization level resolution.
//!
//! Levels are computed once per identity: the `public` entry of the policy is
//! the base, and the entry of every role the identity carries is laid over it
//! in the order the roles were asserted.
use tracing::debug;

use super::credentials::Identity;
use super::policy::{AccessLevel, Policy, RolePermissions};

/// Wildcard operation, used when a role has no entry for the exact operation.
pub const ANY_OPERATION: &str = "*";

pub const TRANSFER: &str = "transfer";
pub const DELEGATION: &str = "deleg";
pub const CONFIG: &str = "config";
pub const DATA_MANAGEMENT: &str = "datamanagement";

/// Operation -> level granted to one identity.
pub type GrantedLevels = RolePermissions;

pub fn resolve_levels<I, S>(roles: I, policy: &Policy) -> GrantedLevels
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut granted = policy.public().cloned().unwrap_or_default();

    for role in roles {
        let role = role.as_ref();
        let Some(permissions) = policy.permissions_for(role) else {
            continue;
        };

        for (operation, level) in permissions {
            if let Some(previous) = granted.insert(operation.clone(), *level) {
                if previous != *level {
                    debug!(
                        role,
                        operation = %operation,
                        %previous,
                        granted = %level,
                        "role overrides granted level"
                    );
                }
            }
        }
    }

    granted
}

/// What a request is trying to touch. `None` fields are not checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resource<'a> {
    pub owner_dn: Option<&'a str>,
    pub vo: Option<&'a str>,
}

impl<'a> Resource<'a> {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn owned_by(owner_dn: &'a str, vo: &'a str) -> Self {
        Self {
            owner_dn: Some(owner_dn),
            vo: Some(vo),
        }
    }
}

impl Identity {
    /// Level granted for `operation`, falling back to the `*` entry.
    ///
    /// `None` means the operation is not allowed at all.
    pub fn granted_level_for(&self, operation: &str) -> Option<AccessLevel> {
        self.granted_levels()
            .get(operation)
            .or_else(|| self.granted_levels().get(ANY_OPERATION))
            .copied()
    }

    /// Whether `operation` may be performed on `resource`, given the scope the
    /// identity was granted for it.
    pub fn is_authorized(&self, operation: &str, resource: &Resource<'_>) -> bool {
        match self.granted_level_for(operation) {
            Some(AccessLevel::All) => true,
            Some(AccessLevel::Vo) => resource.vo.is_none_or(|vo| self.has_vo(vo)),
            Some(AccessLevel::Private) => resource
                .owner_dn
                .is_none_or(|owner| self.primary_dn() == Some(owner)),
            Some(AccessLevel::None) | None => false,
        }
    }
}
