pub mod authz;
pub mod credentials;
pub mod delegation;
pub mod fqan;
pub mod policy;
pub mod virtual_vo;

pub use authz::{GrantedLevels, Resource};
pub use credentials::{CredentialSource, Identity};
pub use policy::{AccessLevel, Policy, PolicyError};
