use serde::Serialize;

use crate::services::auth::{GrantedLevels, Identity};

/// What the server understood from the client credentials.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_dn: Option<String>,
    pub dn: Vec<String>,
    pub vos: Vec<String>,
    pub voms_cred: Vec<String>,
    pub delegation_id: Option<String>,
    pub roles: Vec<String>,
    pub level: GrantedLevels,
}

impl From<&Identity> for WhoAmIResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            user_dn: identity.primary_dn().map(str::to_owned),
            dn: identity.distinguished_names().to_vec(),
            vos: identity.vo_memberships().to_vec(),
            voms_cred: identity.voms_attributes().to_vec(),
            delegation_id: identity.delegation_id().map(str::to_owned),
            roles: identity.roles().to_vec(),
            level: identity.granted_levels().clone(),
        }
    }
}
