//! "Virtual" VO for users that present a plain certificate, with no VOMS
//! extensions: `/DC=ch/DC=cern/CN=Test User` -> `TestUser@cern.ch`.

pub fn build_virtual_vo(dn: &str) -> String {
    let mut domain = Vec::new();
    let mut username = "";

    let components = dn.split('/').filter_map(|component| {
        let mut parts = component.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => Some((key, value)),
            _ => None,
        }
    });

    for (key, value) in components {
        if key.eq_ignore_ascii_case("CN") {
            username = value;
        } else if key.eq_ignore_ascii_case("DC") {
            domain.push(value);
        }
    }

    let username: String = username.split_whitespace().collect();
    domain.reverse();
    format!("{}@{}", username, domain.join("."))
}
