//! Caller identity, as asserted by the front-end web server.
//!
//! The web server terminates TLS, validates the client certificate (and its
//! VOMS extensions, if any) and hands the result over as a flat set of
//! variables:
//! - `GRST_CRED_AURI_<n>`, for n = 0, 1, ... up to the first gap, each either
//!   `dn:<url-encoded DN>` or `fqan:<url-encoded FQAN>`
//! - `SSL_CLIENT_S_DN`, the plain certificate subject
//!
//! `Identity::extract` never fails. Whatever cannot be understood is skipped,
//! and an empty source simply yields an unauthenticated identity.
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use axum::http::HeaderMap;
use percent_encoding::percent_decode_str;

use super::authz::{GrantedLevels, resolve_levels};
use super::delegation::derive_delegation_id;
use super::fqan::{roles_from_fqans, vo_from_fqan};
use super::policy::Policy;
use super::virtual_vo::build_virtual_vo;

pub const GRST_CRED_PREFIX: &str = "GRST_CRED_AURI_";
pub const SSL_CLIENT_DN: &str = "SSL_CLIENT_S_DN";

const DN_TAG: &str = "dn:";
const FQAN_TAG: &str = "fqan:";

/// Key/value lookup the credentials are read from.
///
/// A present key always yields a value, even when it cannot be decoded
/// cleanly: the GRST scan stops at the first absent key, not at the first
/// odd one.
pub trait CredentialSource {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<S: BuildHasher> CredentialSource for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl CredentialSource for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

/// Behind a reverse proxy the variables travel as request headers:
/// `GRST_CRED_AURI_0` is expected as `grst-cred-auri-0`. Header bytes are
/// read as UTF-8, invalid sequences replaced.
impl CredentialSource for HeaderMap {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        let name = key.to_ascii_lowercase().replace('_', "-");
        self.get(name.as_str())
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
    }
}

impl<T: CredentialSource + ?Sized> CredentialSource for &T {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).lookup(key)
    }
}

/// Credentials and privileges of the caller of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    distinguished_names: Vec<String>,
    voms_attributes: Vec<String>,
    vo_memberships: Vec<String>,
    roles: Vec<String>,
    delegation_id: Option<String>,
    granted_levels: GrantedLevels,
}

impl Identity {
    pub fn extract<S>(source: &S, policy: &Policy) -> Self
    where
        S: CredentialSource + ?Sized,
    {
        let mut distinguished_names = Vec::new();
        let mut voms_attributes = Vec::new();
        let mut vo_memberships: Vec<String> = Vec::new();

        let grst_values = (0..).map_while(|i| source.lookup(&format!("{GRST_CRED_PREFIX}{i}")));
        for value in grst_values {
            if let Some(dn) = value.strip_prefix(DN_TAG) {
                distinguished_names.push(url_decode(dn));
            } else if let Some(fqan) = value.strip_prefix(FQAN_TAG) {
                let fqan = url_decode(fqan);
                let vo = vo_from_fqan(&fqan);
                if !vo.is_empty() && !vo_memberships.contains(&vo) {
                    vo_memberships.push(vo);
                }
                voms_attributes.push(fqan);
            }
        }

        if distinguished_names.is_empty() {
            if let Some(dn) = source.lookup(SSL_CLIENT_DN) {
                distinguished_names.push(url_decode(&dn));
            }
        }

        let primary_dn = distinguished_names.first();
        let delegation_id = primary_dn.map(|dn| derive_delegation_id(dn, &voms_attributes));

        if vo_memberships.is_empty() {
            if let Some(dn) = primary_dn {
                vo_memberships.push(build_virtual_vo(dn));
            }
        }

        let roles = roles_from_fqans(&voms_attributes);
        let granted_levels = resolve_levels(&roles, policy);

        Self {
            distinguished_names,
            voms_attributes,
            vo_memberships,
            roles,
            delegation_id,
            granted_levels,
        }
    }

    /// Canonical DN of the caller. `None` when no certificate was presented.
    pub fn primary_dn(&self) -> Option<&str> {
        self.distinguished_names.first().map(String::as_str)
    }

    pub fn is_authenticated(&self) -> bool {
        self.primary_dn().is_some()
    }

    pub fn distinguished_names(&self) -> &[String] {
        &self.distinguished_names
    }

    pub fn voms_attributes(&self) -> &[String] {
        &self.voms_attributes
    }

    pub fn vo_memberships(&self) -> &[String] {
        &self.vo_memberships
    }

    /// VO new jobs are accounted to.
    pub fn primary_vo(&self) -> Option<&str> {
        self.vo_memberships.first().map(String::as_str)
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn delegation_id(&self) -> Option<&str> {
        self.delegation_id.as_deref()
    }

    /// Key of the delegated proxy in the credential store: `(delegation_id, dn)`.
    pub fn delegation_key(&self) -> Option<(&str, &str)> {
        self.delegation_id().zip(self.primary_dn())
    }

    pub fn granted_levels(&self) -> &GrantedLevels {
        &self.granted_levels
    }

    pub fn has_vo(&self, vo: &str) -> bool {
        self.vo_memberships.iter().any(|v| v == vo)
    }
}

// `+` stands for a space, as in form encoding.
fn url_decode(value: &str) -> String {
    let value = value.replace('+', " ");
    percent_decode_str(&value).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::services::auth::policy::AccessLevel;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn is_delegation_id(id: &str) -> bool {
        id.len() == 16 && id.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
    }

    #[test]
    fn empty_source_is_unauthenticated() {
        let identity = Identity::extract(&env(&[]), &Policy::default());

        assert_eq!(identity.primary_dn(), None);
        assert!(!identity.is_authenticated());
        assert!(identity.vo_memberships().is_empty());
        assert!(identity.roles().is_empty());
        assert_eq!(identity.delegation_id(), None);
        assert_eq!(identity.delegation_key(), None);
        assert!(identity.granted_levels().is_empty());
    }

    #[test]
    fn unauthenticated_still_gets_public_levels() {
        let policy: Policy = [("public", [("*", AccessLevel::Private)])].into_iter().collect();
        let identity = Identity::extract(&env(&[]), &policy);

        assert_eq!(identity.granted_level_for("transfer"), Some(AccessLevel::Private));
    }

    #[test]
    fn dn_only_gets_a_virtual_vo() {
        let source = env(&[("GRST_CRED_AURI_0", "dn:/O=Grid/CN=Test User")]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.primary_dn(), Some("/O=Grid/CN=Test User"));
        assert_eq!(identity.vo_memberships(), ["TestUser@"]);
        assert!(identity.delegation_id().is_some_and(is_delegation_id));
    }

    #[test]
    fn voms_proxy() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:%2FDC%3Dch%2FDC%3Dcern%2FCN%3DTest+User"),
            ("GRST_CRED_AURI_1", "fqan:%2Fdteam%2FRole%3Dlcgadmin%2FCapability%3DNULL"),
            ("GRST_CRED_AURI_2", "fqan:/dteam/Role=NULL/Capability=NULL"),
            ("GRST_CRED_AURI_3", "fqan:/dteam/cern/Role=NULL/Capability=NULL"),
        ]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.primary_dn(), Some("/DC=ch/DC=cern/CN=Test User"));
        assert_eq!(
            identity.voms_attributes(),
            [
                "/dteam/Role=lcgadmin/Capability=NULL",
                "/dteam/Role=NULL/Capability=NULL",
                "/dteam/cern/Role=NULL/Capability=NULL",
            ]
        );
        assert_eq!(identity.vo_memberships(), ["dteam", "dteam/cern"]);
        assert_eq!(identity.roles(), ["lcgadmin"]);
        assert!(identity.has_vo("dteam/cern"));
        assert!(!identity.has_vo("cern"));
        assert_eq!(identity.primary_vo(), Some("dteam"));

        let expected = derive_delegation_id(
            "/DC=ch/DC=cern/CN=Test User",
            identity.voms_attributes(),
        );
        assert_eq!(identity.delegation_id(), Some(expected.as_str()));
        assert_eq!(
            identity.delegation_key(),
            Some((expected.as_str(), "/DC=ch/DC=cern/CN=Test User"))
        );
    }

    #[test]
    fn scan_stops_at_first_gap() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:/CN=first"),
            ("GRST_CRED_AURI_2", "fqan:/atlas"),
        ]);
        let identity = Identity::extract(&source, &Policy::default());

        assert!(identity.voms_attributes().is_empty());
        assert_eq!(identity.vo_memberships(), ["first@"]);
    }

    #[test]
    fn every_dn_is_kept_first_is_primary() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:/CN=first"),
            ("GRST_CRED_AURI_1", "dn:/CN=second"),
        ]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.distinguished_names(), ["/CN=first", "/CN=second"]);
        assert_eq!(identity.primary_dn(), Some("/CN=first"));
    }

    #[test]
    fn unknown_tags_are_skipped_not_a_gap() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:/CN=me"),
            ("GRST_CRED_AURI_1", "something:else"),
            ("GRST_CRED_AURI_2", "fqan:/atlas/Role=production"),
        ]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.vo_memberships(), ["atlas"]);
        assert_eq!(identity.roles(), ["production"]);
    }

    #[test]
    fn duplicate_fqans_keep_attributes_and_roles_but_not_vos() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:/CN=me"),
            ("GRST_CRED_AURI_1", "fqan:/atlas/Role=production"),
            ("GRST_CRED_AURI_2", "fqan:/atlas/Role=production"),
        ]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.voms_attributes().len(), 2);
        assert_eq!(identity.vo_memberships(), ["atlas"]);
        assert_eq!(identity.roles(), ["production", "production"]);
    }

    #[test]
    fn role_only_fqan_falls_back_to_virtual_vo() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:/DC=org/CN=me"),
            ("GRST_CRED_AURI_1", "fqan:/Role=admin"),
        ]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.vo_memberships(), ["me@org"]);
        assert_eq!(identity.roles(), ["admin"]);
    }

    #[test]
    fn ssl_subject_is_the_fallback() {
        let source = env(&[(SSL_CLIENT_DN, "/DC=ch/DC=cern/CN=Plain+Cert")]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.primary_dn(), Some("/DC=ch/DC=cern/CN=Plain Cert"));
        assert_eq!(identity.vo_memberships(), ["PlainCert@cern.ch"]);
    }

    #[test]
    fn ssl_subject_ignored_when_grst_has_a_dn() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:/CN=from-gridsite"),
            (SSL_CLIENT_DN, "/CN=from-ssl"),
        ]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.distinguished_names(), ["/CN=from-gridsite"]);
    }

    #[test]
    fn fqans_without_dn_are_not_authenticated() {
        let source = env(&[("GRST_CRED_AURI_0", "fqan:/dteam/Role=lcgadmin")]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.primary_dn(), None);
        assert_eq!(identity.delegation_id(), None);
        assert_eq!(identity.vo_memberships(), ["dteam"]);
        assert_eq!(identity.roles(), ["lcgadmin"]);
    }

    #[test]
    fn malformed_escapes_are_kept_verbatim() {
        let source = env(&[("GRST_CRED_AURI_0", "dn:/CN=100%/CN=%zz")]);
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.primary_dn(), Some("/CN=100%/CN=%zz"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let source = env(&[
            ("GRST_CRED_AURI_0", "dn:/DC=ch/DC=cern/CN=Test User"),
            ("GRST_CRED_AURI_1", "fqan:/dteam/Role=lcgadmin"),
        ]);
        let policy: Policy = [("lcgadmin", [("config", AccessLevel::All)])].into_iter().collect();

        assert_eq!(Identity::extract(&source, &policy), Identity::extract(&source, &policy));
    }

    #[test]
    fn reads_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("grst-cred-auri-0", HeaderValue::from_static("dn:/DC=ch/CN=Header+User"));
        headers.insert("grst-cred-auri-1", HeaderValue::from_static("fqan:/dteam/Role=lcgadmin"));
        let identity = Identity::extract(&headers, &Policy::default());

        assert_eq!(identity.primary_dn(), Some("/DC=ch/CN=Header User"));
        assert_eq!(identity.roles(), ["lcgadmin"]);
    }

    #[test]
    fn non_ascii_header_does_not_end_the_scan() {
        let mut headers = HeaderMap::new();
        headers.insert("grst-cred-auri-0", HeaderValue::from_static("dn:/DC=ch/CN=me"));
        headers.insert(
            "grst-cred-auri-1",
            HeaderValue::from_bytes("fqan:/déteam".as_bytes()).unwrap(),
        );
        headers.insert(
            "grst-cred-auri-2",
            HeaderValue::from_static("fqan:/atlas/Role=production"),
        );
        let identity = Identity::extract(&headers, &Policy::default());

        assert_eq!(identity.voms_attributes(), ["/déteam", "/atlas/Role=production"]);
        assert_eq!(identity.vo_memberships(), ["déteam", "atlas"]);
        assert_eq!(identity.roles(), ["production"]);
        assert_eq!(
            identity.delegation_id(),
            Some(derive_delegation_id("/DC=ch/CN=me", identity.voms_attributes()).as_str())
        );
    }

    #[test]
    fn invalid_utf8_header_is_still_present() {
        let mut headers = HeaderMap::new();
        headers.insert("grst-cred-auri-0", HeaderValue::from_static("dn:/DC=ch/CN=me"));
        headers.insert("grst-cred-auri-1", HeaderValue::from_bytes(b"fqan:/\xffbad").unwrap());
        headers.insert("grst-cred-auri-2", HeaderValue::from_static("fqan:/atlas"));
        let identity = Identity::extract(&headers, &Policy::default());

        assert_eq!(identity.voms_attributes().len(), 2);
        assert_eq!(identity.voms_attributes()[0], "/\u{FFFD}bad");
        assert!(identity.has_vo("atlas"));
    }

    #[test]
    fn utf8_ssl_subject_header_is_authenticated() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "ssl-client-s-dn",
            HeaderValue::from_bytes("/DC=ch/CN=José".as_bytes()).unwrap(),
        );
        let identity = Identity::extract(&headers, &Policy::default());

        assert_eq!(identity.primary_dn(), Some("/DC=ch/CN=José"));
        assert_eq!(identity.vo_memberships(), ["José@ch"]);
    }

    #[test]
    fn btree_sources_work_too() {
        let source: BTreeMap<String, String> =
            [(SSL_CLIENT_DN.to_string(), "/CN=btree".to_string())].into();
        let identity = Identity::extract(&source, &Policy::default());

        assert_eq!(identity.primary_dn(), Some("/CN=btree"));
    }
}
