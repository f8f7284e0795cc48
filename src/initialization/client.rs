//! HTTP client initialization.
//!
//! This module builds the underlying `reqwest` blocking client from a
//! browser configuration. The client is rebuilt (with a fresh cookie jar)
//! whenever the configuration changes or a new session begins.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::cookie::Jar;
use reqwest::{Certificate, Identity, Proxy};

use crate::config::{BrowserConfig, HttpVersion};
use crate::error_handling::ConfigurationError;
use crate::transport;

/// Builds the underlying HTTP client from the configuration.
///
/// Creates a `reqwest::blocking::Client` configured with:
/// - Request timeout (and TCP connect timeout when set)
/// - TLS certificate validation per the `verify` option (off by default)
/// - A fresh per-session cookie jar unless `cookies` is disabled
/// - Proxy, root CA, client identity, and protocol version when configured
/// - Any validated low-level transport flags
///
/// # Arguments
///
/// * `config` - The browser configuration to realize
///
/// # Returns
///
/// A shared handle to the configured client. Sharing the handle shares the
/// cookie jar and connection pool.
///
/// # Errors
///
/// Returns a `ConfigurationError` if certificate material cannot be read,
/// a transport flag is invalid, or the transport library rejects the
/// assembled options.
pub fn build_http_client(config: &BrowserConfig) -> Result<Arc<Client>, ConfigurationError> {
    let flags = transport::parse_flags(&config.transport)?;

    let mut builder = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout))
        .danger_accept_invalid_certs(!config.verify);

    // The global timeout alone lets a slow TCP connect eat the whole
    // request budget, so the connect phase gets its own limit when set.
    if let Some(secs) = config.connect_timeout {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    builder = if config.cookies {
        builder.cookie_provider(Arc::new(Jar::default()))
    } else {
        builder.cookie_store(false)
    };

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    if let Some(path) = &config.cert {
        let pem = fs::read(path).map_err(|source| ConfigurationError::Certificate {
            path: path.clone(),
            source,
        })?;
        builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
    }

    if let Some(path) = &config.ssl_key {
        let pem = fs::read(path).map_err(|source| ConfigurationError::Certificate {
            path: path.clone(),
            source,
        })?;
        builder = builder.identity(Identity::from_pem(&pem)?);
    }

    match config.version {
        Some(HttpVersion::Http1) => builder = builder.http1_only(),
        Some(HttpVersion::Http2) => builder = builder.http2_prior_knowledge(),
        None => {}
    }

    builder = transport::apply_flags(builder, &flags);

    Ok(Arc::new(builder.build()?))
}
