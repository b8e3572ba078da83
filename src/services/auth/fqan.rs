//! VOMS FQAN parsing.
//!
//! An FQAN looks like `/<vo>/<group>.../Role=<name>/Capability=<value>`.
//! Everything here is best-effort: attributes come from the front-end web
//! server and are not always well formed, so nothing in this module fails.

const ROLE_KEY: &str = "role=";
const ROLE_MARKER: &str = "/role=";
const NULL_VALUE: &str = "NULL";

/// VO (plus sub-groups) asserted by a single FQAN.
///
/// `/dteam/cern/Role=lcgadmin` -> `dteam/cern`
pub fn vo_from_fqan(fqan: &str) -> String {
    fqan.split('/')
        .skip(1)
        .take_while(|segment| !starts_with_ignore_case(segment, ROLE_KEY))
        .filter(|segment| !is_null_placeholder(segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Role asserted by a single FQAN, if any.
///
/// When several `Role=` segments are present the last one wins. `Role=NULL`
/// is the VOMS placeholder for "no role" and yields `None`.
pub fn role_from_fqan(fqan: &str) -> Option<&str> {
    let lower = fqan.to_ascii_lowercase();

    for (pos, _) in lower.rmatch_indices(ROLE_MARKER) {
        // Anything before the marker must itself be a `/`-rooted path.
        if pos != 0 && !(pos >= 2 && fqan.starts_with('/')) {
            continue;
        }

        let start = pos + ROLE_MARKER.len();
        let len = fqan[start..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if len == 0 {
            continue;
        }

        let role = &fqan[start..start + len];
        if role.eq_ignore_ascii_case(NULL_VALUE) {
            return None;
        }
        return Some(role);
    }

    None
}

/// Roles asserted across all FQANs, in order. Duplicates are kept.
pub fn roles_from_fqans<I, S>(fqans: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fqans
        .into_iter()
        .filter_map(|fqan| role_from_fqan(fqan.as_ref()).map(str::to_owned))
        .collect()
}

fn starts_with_ignore_case(segment: &str, prefix: &str) -> bool {
    segment
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// `Capability=NULL` and friends carry no group information.
fn is_null_placeholder(segment: &str) -> bool {
    segment
        .split_once('=')
        .is_some_and(|(_, value)| value == NULL_VALUE)
}
