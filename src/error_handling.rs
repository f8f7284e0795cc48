//! Error type definitions.
//!
//! Two error families exist at this scope:
//! - **`ConfigurationError`**: the configuration is unusable or the underlying
//!   transport library rejected the supplied options. Surfaced at
//!   initialization time and fatal to the test.
//! - **`BrowserError`**: a runtime failure inside a session (no response yet,
//!   unresolvable page, failed request). Reported to the caller as-is; this
//!   module performs no retries.

use std::path::PathBuf;

use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Errors raised while turning a configuration into an HTTP client.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The required `url` key is missing or empty.
    #[error("configuration is missing the required 'url' option")]
    MissingUrl,

    /// The base URL could not be parsed or does not use an http(s) scheme.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// The subdomain label passed to a subdomain switch is not usable.
    #[error("invalid subdomain label: {0:?}")]
    InvalidSubdomain(String),

    /// The configuration map could not be deserialized.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A name in the `transport` map is not a recognized transport flag.
    ///
    /// The original implementation silently skipped unknown symbolic
    /// transport constants; this crate rejects them at configuration-load
    /// time instead.
    #[error("unrecognized transport flag '{name}' (recognized flags: {recognized})")]
    UnknownTransportFlag {
        /// The offending name from the `transport` map.
        name: String,
        /// Comma-separated list of all recognized flag names.
        recognized: String,
    },

    /// A recognized transport flag carries a value of the wrong type.
    #[error("transport flag '{flag}' has an invalid value: expected {expected}")]
    InvalidTransportValue {
        /// The flag whose value was rejected.
        flag: String,
        /// Human-readable description of the expected value type.
        expected: &'static str,
    },

    /// Certificate or client-key material could not be read from disk.
    #[error("failed to read certificate material from {path}: {source}")]
    Certificate {
        /// Path the configuration pointed at.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The underlying transport library rejected the assembled options.
    #[error("HTTP client initialization error: {0}")]
    HttpClient(#[from] ReqwestError),
}

/// Errors raised by session operations after initialization.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// The status code or last page was queried before any request was made
    /// in the current session.
    #[error("no response yet: no request has been made in this session")]
    NoResponseYet,

    /// The page argument could not be resolved against the base URL.
    #[error("cannot resolve page {0:?} against the base URL")]
    InvalidPage(String),

    /// A single HTTP request failed (connect, timeout, or body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),
}
