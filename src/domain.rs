use url::Url;

/// Extract the normalized domain from an absolute URL: scheme, `www.` prefix,
/// path, query and fragment are all stripped, leaving the bare host.
///
/// Returns `None` when the string does not parse as an absolute URL or has no
/// host component. Callers treat that as a per-record exclusion, never as a
/// batch failure.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;

    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }

    Some(host.to_ascii_lowercase())
}
