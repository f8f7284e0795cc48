//! Browser configuration.
//!
//! The host test-configuration loader hands this module a key-value map
//! (JSON-shaped); [`BrowserConfig::from_value`] turns it into a typed
//! configuration with the documented defaults. Unrecognized top-level keys
//! are ignored for forward compatibility, but names in the `transport` map
//! are validated against the [`TransportFlag`](crate::TransportFlag)
//! enumeration and rejected when unknown.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error_handling::ConfigurationError;
use crate::transport;

// constants (used as defaults)
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// URL validation
/// Base URLs must use an http or https scheme.
pub const URL_SCHEME_PATTERN: &str = r"^https?://";

static URL_SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(URL_SCHEME_PATTERN).expect("Failed to compile URL scheme pattern - this is a bug")
});

/// Logging level for the browser module.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace). Deserializable so the host suite configuration can
/// carry it alongside the browser options.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Normal operational output.
    Info,
    /// Per-request detail.
    Debug,
    /// Everything.
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: human-readable format with colors (default)
/// - `Json`: structured JSON format for machine parsing
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Colored, human-readable lines.
    Plain,
    /// One JSON object per line.
    Json,
}

/// HTTP basic-auth credentials applied to every request.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BasicAuth {
    /// User name.
    pub username: String,
    /// Password; `None` sends an empty password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Preferred HTTP protocol version.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum HttpVersion {
    /// Force HTTP/1.x.
    #[serde(rename = "1.1", alias = "1.0")]
    Http1,
    /// Speak HTTP/2 from the first byte (prior knowledge).
    #[serde(rename = "2", alias = "2.0")]
    Http2,
}

/// Declarative browser configuration.
///
/// `url` is the only required option; everything else has a stated default.
/// The configuration is fixed at construction time; the HTTP client is
/// rebuilt from it whenever the configuration changes (a subdomain switch)
/// or a new session begins.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Base URL of the application under test (required).
    pub url: String,

    /// Validate TLS certificates. Disabled by default so suites can run
    /// against self-signed staging hosts.
    pub verify: bool,

    /// Send `Expect: 100-continue` with every request.
    pub expect: bool,

    /// Per-request timeout in seconds.
    pub timeout: u64,

    /// TCP connect timeout in seconds. The global timeout alone lets slow
    /// connects eat the whole budget, so suites targeting flaky hosts
    /// should set this too.
    pub connect_timeout: Option<u64>,

    /// Default request headers, sent with every request of a session.
    pub headers: HashMap<String, String>,

    /// Basic-auth credentials.
    pub auth: Option<BasicAuth>,

    /// Proxy URL for all requests.
    pub proxy: Option<String>,

    /// Path to an additional root CA certificate (PEM).
    pub cert: Option<PathBuf>,

    /// Path to a client identity (PEM certificate + key).
    pub ssl_key: Option<PathBuf>,

    /// Default query parameters appended to every request.
    pub query: HashMap<String, String>,

    /// Keep cookies across requests within a session.
    pub cookies: bool,

    /// Preferred HTTP protocol version.
    pub version: Option<HttpVersion>,

    /// Low-level transport flags, validated against
    /// [`TransportFlag`](crate::TransportFlag) at load time.
    pub transport: HashMap<String, serde_json::Value>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            verify: false,
            expect: false,
            timeout: DEFAULT_TIMEOUT_SECS,
            connect_timeout: None,
            headers: HashMap::new(),
            auth: None,
            proxy: None,
            cert: None,
            ssl_key: None,
            query: HashMap::new(),
            cookies: true,
            version: None,
            transport: HashMap::new(),
        }
    }
}

impl BrowserConfig {
    /// Builds a configuration from the key-value map supplied by the host
    /// test-configuration loader.
    ///
    /// Unknown top-level keys are ignored; unknown transport flag names and
    /// a missing `url` are rejected immediately so misconfiguration fails
    /// the suite at initialization, not mid-test.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingUrl` if the map has no usable
    /// `url`, `InvalidConfig` if a recognized key carries the wrong shape,
    /// and `UnknownTransportFlag`/`InvalidTransportValue` for bad entries
    /// in the `transport` map.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigurationError> {
        let has_url = value
            .get("url")
            .and_then(|v| v.as_str())
            .is_some_and(|s| !s.is_empty());
        if !has_url {
            return Err(ConfigurationError::MissingUrl);
        }

        let config: BrowserConfig = serde_json::from_value(value)
            .map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))?;

        config.validated_base_url()?;
        transport::parse_flags(&config.transport)?;

        Ok(config)
    }

    /// Parses and validates the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingUrl` for an empty URL and
    /// `InvalidUrl` when the URL does not parse or is not http(s).
    pub fn validated_base_url(&self) -> Result<Url, ConfigurationError> {
        if self.url.is_empty() {
            return Err(ConfigurationError::MissingUrl);
        }
        if !URL_SCHEME_RE.is_match(&self.url) {
            return Err(ConfigurationError::InvalidUrl(self.url.clone()));
        }
        Url::parse(&self.url).map_err(|_| ConfigurationError::InvalidUrl(self.url.clone()))
    }
}
