//! Subdomain rewriting for the base URL.
//!
//! The original implementation performed two independent regex passes
//! (remove the leftmost label, then insert the new one after the scheme),
//! which misbehaved on URLs without an existing subdomain. This module
//! replaces that with a single host-label rewrite: the host is parsed once,
//! the leftmost label is replaced when the host has three or more labels,
//! and the new label is prepended otherwise. The outcome for every input the
//! original handled is unchanged, including the documented edge case where
//! `http://example.com` gains a label.

use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

use crate::error_handling::ConfigurationError;

// A DNS label: alphanumeric, hyphens allowed inside.
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?$")
        .expect("Failed to compile DNS label pattern - this is a bug")
});

/// Rewrites the subdomain of a base URL, returning the new URL string.
///
/// Only the host's byte range inside the URL string is spliced, so
/// everything else about the string (scheme, userinfo, port, path,
/// absence of a trailing slash) is preserved exactly as configured. The
/// new host is the parser's normalized form, so a mixed-case configured
/// host comes back lowercased.
///
/// # Arguments
///
/// * `url` - The current base URL string
/// * `subdomain` - The new leftmost host label
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidSubdomain` when `subdomain` is not a
/// valid DNS label, and `InvalidUrl` when the URL does not parse or its
/// host is not a domain name (e.g. an IP address).
pub fn rewrite_subdomain(url: &str, subdomain: &str) -> Result<String, ConfigurationError> {
    if !LABEL_RE.is_match(subdomain) {
        return Err(ConfigurationError::InvalidSubdomain(subdomain.to_string()));
    }

    let parsed = Url::parse(url).map_err(|_| ConfigurationError::InvalidUrl(url.to_string()))?;
    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        _ => return Err(ConfigurationError::InvalidUrl(url.to_string())),
    };

    let labels: Vec<&str> = host.split('.').collect();
    let new_host = if labels.len() >= 3 {
        format!("{}.{}", subdomain, labels[1..].join("."))
    } else {
        format!("{subdomain}.{host}")
    };

    let (start, end) =
        host_span(url).ok_or_else(|| ConfigurationError::InvalidUrl(url.to_string()))?;
    Ok(format!("{}{}{}", &url[..start], new_host, &url[end..]))
}

/// Byte range of the host inside a URL string that has already parsed.
///
/// Locating the host positionally (after the scheme and any userinfo,
/// before any port) keeps the splice correct when the configured host is
/// mixed-case or when a userinfo component textually equals the host.
fn host_span(url: &str) -> Option<(usize, usize)> {
    let scheme_end = url.find("://")? + 3;
    let authority_end = url[scheme_end..]
        .find(['/', '?', '#'])
        .map(|i| scheme_end + i)
        .unwrap_or(url.len());
    let host_start = url[scheme_end..authority_end]
        .rfind('@')
        .map(|i| scheme_end + i + 1)
        .unwrap_or(scheme_end);
    let host_end = url[host_start..authority_end]
        .rfind(':')
        .map(|i| host_start + i)
        .unwrap_or(authority_end);
    Some((host_start, host_end))
}
