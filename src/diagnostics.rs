use crate::config::{RelyingParty, MAX_CONFIGURABLE_INPUT_LEN};
use crate::webauthn::authenticator_data::MIN_AUTH_DATA_LEN;

/// Host part of an origin: scheme stripped, port stripped.
fn origin_host(origin: &str) -> Option<&str> {
    let (_, rest) = origin.split_once("://")?;
    if rest.contains('/') {
        return None;
    }
    let host = match rest.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => rest,
    };
    (!host.is_empty()).then_some(host)
}

pub fn check(rp: &RelyingParty) -> anyhow::Result<()> {
    let mut errors: Vec<String> = Vec::new();

    // Check 1: rp id present
    if rp.rp_id.is_empty() {
        errors.push(
            "rp id is empty\n  → set it to the registrable domain, e.g. example.com".into(),
        );
    }

    // Check 2: origin is a bare scheme://host[:port]
    match origin_host(&rp.origin) {
        None => errors.push(format!(
            "origin '{}' is not of the form scheme://host[:port]\n  \
             → origins carry no path or trailing slash",
            rp.origin
        )),
        Some(host) => {
            let secure = rp.origin.starts_with("https://");
            if !secure && host != "localhost" {
                errors.push(format!(
                    "origin '{}' is not https\n  → only http://localhost is allowed without TLS",
                    rp.origin
                ));
            }
            // Check 3: rp id is the origin host or a parent domain of it
            if !rp.rp_id.is_empty()
                && host != rp.rp_id
                && !host.ends_with(&format!(".{}", rp.rp_id))
            {
                errors.push(format!(
                    "rp id '{}' is not a registrable suffix of origin host '{host}'",
                    rp.rp_id
                ));
            }
        }
    }

    // Check 4: input bound
    if rp.max_input_len < MIN_AUTH_DATA_LEN || rp.max_input_len > MAX_CONFIGURABLE_INPUT_LEN {
        errors.push(format!(
            "max input length {} outside {MIN_AUTH_DATA_LEN}..={MAX_CONFIGURABLE_INPUT_LEN}",
            rp.max_input_len
        ));
    }

    // Check 5: timeout
    if rp.verify_timeout_secs == 0 {
        errors.push(
            "verification timeout is 0\n  → every verification would be cancelled".into(),
        );
    }

    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("ERROR: {err}");
    }
    anyhow::bail!("{} preflight check(s) failed", errors.len());
}
