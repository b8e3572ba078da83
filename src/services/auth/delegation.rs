//! Delegation ID derivation.
//!
//! The identifier must match the one the transfer servers compute for the same
//! proxy, so the digest input is fed exactly as they do: the DN first, then
//! every FQAN, as separate updates with nothing in between.
use sha1::{Digest, Sha1};

/// Length (in hex characters) of a delegation ID.
pub const DELEGATION_ID_LEN: usize = 16;

pub fn derive_delegation_id<I, S>(dn: &str, fqans: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha1::new();
    hasher.update(dn.as_bytes());
    for fqan in fqans {
        hasher.update(fqan.as_ref().as_bytes());
    }

    let mut id = hex::encode(hasher.finalize());
    id.truncate(DELEGATION_ID_LEN);
    id
}
