//! The browser session: request wrapper, session lifecycle, and
//! snapshot/restore for multi-session test scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use reqwest::blocking::Client;
use url::Url;

use crate::config::{BasicAuth, BrowserConfig};
use crate::error_handling::{BrowserError, ConfigurationError};
use crate::initialization::build_http_client;
use crate::page::Page;
use crate::subdomain::rewrite_subdomain;

/// The request/response wrapper a session drives.
///
/// Holds the base URL, the default header set, and a shared handle to the
/// underlying HTTP client (which owns the session's cookie jar). Cloning a
/// `PageClient` shares the client and cookie jar; the header map is copied
/// by value.
#[derive(Clone, Debug)]
pub struct PageClient {
    http: Arc<Client>,
    base_url: Url,
    base_url_raw: String,
    headers: HashMap<String, String>,
    query: Vec<(String, String)>,
    auth: Option<BasicAuth>,
    expect_continue: bool,
}

impl PageClient {
    fn new(http: Arc<Client>, config: &BrowserConfig) -> Result<Self, ConfigurationError> {
        let base_url = config.validated_base_url()?;
        Ok(Self {
            http,
            base_url,
            base_url_raw: config.url.clone(),
            headers: config.headers.clone(),
            query: config
                .query
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            auth: config.auth.clone(),
            expect_continue: config.expect,
        })
    }

    /// The base URL exactly as configured.
    pub fn base_url(&self) -> &str {
        &self.base_url_raw
    }

    /// Sets a default header, overwriting any prior value for the same
    /// (case-sensitive) name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Fetches a page with GET, applying default headers, query parameters,
    /// and credentials.
    ///
    /// `page` may be a path resolved against the base URL or an absolute
    /// http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns `BrowserError::InvalidPage` when the target cannot be
    /// resolved, and `Request` when the transport call fails.
    pub fn get(&self, page: &str) -> Result<Page, BrowserError> {
        let target = self.resolve(page)?;
        debug!("GET {target}");

        let mut request = self.http.get(target);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !self.query.is_empty() {
            request = request.query(&self.query);
        }
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, auth.password.as_deref());
        }
        if self.expect_continue {
            request = request.header("Expect", "100-continue");
        }

        let response = request.send()?;
        let url = response.url().clone();
        let status = response.status();
        let body = response.text()?;
        debug!("{status} {url} ({} bytes)", body.len());

        Ok(Page::new(url, status, body))
    }

    fn resolve(&self, page: &str) -> Result<Url, BrowserError> {
        if page.starts_with("http://") || page.starts_with("https://") {
            Url::parse(page).map_err(|_| BrowserError::InvalidPage(page.to_string()))
        } else {
            self.base_url
                .join(page)
                .map_err(|_| BrowserError::InvalidPage(page.to_string()))
        }
    }
}

/// A captured session state bundle.
///
/// A fixed struct of exactly the fields eligible for snapshot/restore: the
/// request wrapper, the underlying HTTP client, and the last fetched page.
/// Capture shares (not deep-copies) the underlying client and its cookie
/// jar, so a restored snapshot and any still-live clone of it mutate the
/// same cookie store; callers must not interleave the two.
#[derive(Clone)]
pub struct SessionSnapshot {
    client: PageClient,
    http: Arc<Client>,
    last_page: Option<Arc<Page>>,
}

/// A cookie-aware, JavaScript-free browser for one test session.
///
/// Construction validates the configuration and builds the underlying HTTP
/// client; [`before_test`](Self::before_test) resets the session (fresh
/// cookie jar, default headers, no last page) at the start of each test.
#[derive(Debug)]
pub struct BrowserSession {
    config: BrowserConfig,
    http: Arc<Client>,
    client: PageClient,
    last_page: Option<Arc<Page>>,
}

impl BrowserSession {
    /// Initializes a session from a configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` when `url` is missing or invalid, a
    /// transport flag is unknown, or the transport library rejects the
    /// assembled options. Fails here, at initialization, never mid-test.
    pub fn new(config: BrowserConfig) -> Result<Self, ConfigurationError> {
        config.validated_base_url()?;
        let http = build_http_client(&config)?;
        let client = PageClient::new(Arc::clone(&http), &config)?;
        info!("browser session initialized for {}", config.url);
        Ok(Self {
            config,
            http,
            client,
            last_page: None,
        })
    }

    /// Test-runner hook: called once per test start.
    ///
    /// Re-initializes the session, discarding any prior client and page
    /// state. Idempotent per test.
    ///
    /// # Errors
    ///
    /// Propagates client-rebuild failures as a `ConfigurationError`.
    pub fn before_test(&mut self) -> Result<(), ConfigurationError> {
        self.initialize_session()
    }

    /// Rebuilds the session state: a fresh underlying client (and cookie
    /// jar), default headers from the configuration, and no last page.
    ///
    /// # Errors
    ///
    /// Propagates client-rebuild failures as a `ConfigurationError`.
    pub fn initialize_session(&mut self) -> Result<(), ConfigurationError> {
        debug!("initializing session against {}", self.config.url);
        self.http = build_http_client(&self.config)?;
        self.client = PageClient::new(Arc::clone(&self.http), &self.config)?;
        self.last_page = None;
        Ok(())
    }

    /// The base URL of the active session, exactly as configured.
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Sets a default header on the active client wrapper.
    ///
    /// Overwrites any prior value for the same name (case-sensitive key);
    /// cleared on the next session re-initialization.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.client.set_header(name, value);
    }

    /// Moves the session to another subdomain of the configured base URL.
    ///
    /// Rewrites the base URL's leftmost host label and rebuilds the client
    /// against the new URL. Repeated switches replace the label rather than
    /// stacking.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` for an invalid label or a host that
    /// is not a domain name, and propagates client-rebuild failures.
    pub fn switch_subdomain(&mut self, subdomain: &str) -> Result<(), ConfigurationError> {
        let url = rewrite_subdomain(&self.config.url, subdomain)?;
        info!("switching base URL to {url}");
        self.config.url = url;
        self.on_reconfigure()
    }

    /// Configuration-change hook: rebuilds the client against the current
    /// configuration.
    fn on_reconfigure(&mut self) -> Result<(), ConfigurationError> {
        self.initialize_session()
    }

    /// Low-level escape hatch: runs caller-supplied code against the raw
    /// underlying HTTP client and returns whatever it returns.
    ///
    /// Intended for operations this module does not expose; not recommended
    /// for routine use. Failures inside `f` propagate unchanged.
    pub fn with_http_client<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Client) -> R,
    {
        f(&self.http)
    }

    /// Fetches a page with GET and records it as the last response.
    ///
    /// `page` may be a path resolved against the base URL or an absolute
    /// http(s) URL.
    ///
    /// # Returns
    ///
    /// The HTTP status code of the response.
    ///
    /// # Errors
    ///
    /// Returns a `BrowserError` when the target cannot be resolved or the
    /// request fails; a failed request is reported as-is, with no retries.
    pub fn open(&mut self, page: &str) -> Result<u16, BrowserError> {
        let fetched = self.client.get(page)?;
        let status = fetched.status().as_u16();
        self.last_page = Some(Arc::new(fetched));
        Ok(status)
    }

    /// The status code of the most recently fetched response.
    ///
    /// # Errors
    ///
    /// Returns `BrowserError::NoResponseYet` if no request has been made in
    /// the current session.
    pub fn last_status_code(&self) -> Result<u16, BrowserError> {
        self.last_page()
            .map(|page| page.status().as_u16())
    }

    /// The most recently fetched page.
    ///
    /// # Errors
    ///
    /// Returns `BrowserError::NoResponseYet` if no request has been made in
    /// the current session.
    pub fn last_page(&self) -> Result<&Page, BrowserError> {
        self.last_page.as_deref().ok_or(BrowserError::NoResponseYet)
    }

    /// Session-orchestrator hook: captures the current session state.
    ///
    /// The snapshot references (does not deep-copy) the underlying HTTP
    /// client and its cookie jar; see [`SessionSnapshot`].
    pub fn backup_session_data(&self) -> SessionSnapshot {
        debug!("capturing session state for {}", self.base_url());
        SessionSnapshot {
            client: self.client.clone(),
            http: Arc::clone(&self.http),
            last_page: self.last_page.clone(),
        }
    }

    /// Session-orchestrator hook: overwrites the session's client,
    /// underlying client, and last page from a snapshot.
    ///
    /// No validation that the snapshot originated from a compatible
    /// configuration is performed.
    pub fn load_session_data(&mut self, snapshot: SessionSnapshot) {
        debug!("restoring session state for {}", snapshot.client.base_url());
        self.client = snapshot.client;
        self.http = snapshot.http;
        self.last_page = snapshot.last_page;
    }

    /// Session-orchestrator hook: discards a snapshot.
    ///
    /// No explicit connection teardown happens here; pooled connections
    /// close when the last shared handle to the underlying client drops.
    pub fn close_session(&self, snapshot: SessionSnapshot) {
        debug!("closing session for {}", snapshot.client.base_url());
        drop(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(url: &str) -> BrowserSession {
        BrowserSession::new(BrowserConfig {
            url: url.to_string(),
            ..Default::default()
        })
        .expect("session should initialize")
    }

    #[test]
    fn test_base_url_is_returned_unchanged() {
        let browser = session("http://www.example.com");
        assert_eq!(browser.base_url(), "http://www.example.com");
    }

    #[test]
    fn test_missing_url_fails_at_initialization() {
        let err = BrowserSession::new(BrowserConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingUrl));
    }

    #[test]
    fn test_last_status_code_before_any_request() {
        let browser = session("http://www.example.com");
        assert!(matches!(
            browser.last_status_code().unwrap_err(),
            BrowserError::NoResponseYet
        ));
        assert!(matches!(
            browser.last_page().unwrap_err(),
            BrowserError::NoResponseYet
        ));
    }

    #[test]
    fn test_set_header_overwrites_same_name() {
        let mut browser = session("http://www.example.com");
        browser.set_header("X-Test", "1");
        browser.set_header("X-Test", "2");
        assert_eq!(browser.client.headers.get("X-Test"), Some(&"2".to_string()));
        assert_eq!(browser.client.headers.len(), 1);
    }

    #[test]
    fn test_before_test_resets_headers_to_config_defaults() {
        let mut browser = BrowserSession::new(BrowserConfig {
            url: "http://www.example.com".to_string(),
            headers: HashMap::from([("X-Suite".to_string(), "acceptance".to_string())]),
            ..Default::default()
        })
        .unwrap();
        browser.set_header("X-Test", "1");
        browser.before_test().unwrap();
        assert_eq!(
            browser.client.headers.get("X-Suite"),
            Some(&"acceptance".to_string())
        );
        assert!(!browser.client.headers.contains_key("X-Test"));
    }

    #[test]
    fn test_switch_subdomain_rewrites_base_url() {
        let mut browser = session("http://www.example.com");
        browser.switch_subdomain("api").unwrap();
        assert_eq!(browser.base_url(), "http://api.example.com");
        browser.switch_subdomain("api").unwrap();
        assert_eq!(browser.base_url(), "http://api.example.com");
    }

    #[test]
    fn test_switch_subdomain_resets_session_state() {
        let mut browser = session("http://www.example.com");
        browser.set_header("X-Test", "1");
        browser.switch_subdomain("api").unwrap();
        assert!(!browser.client.headers.contains_key("X-Test"));
        assert!(matches!(
            browser.last_status_code().unwrap_err(),
            BrowserError::NoResponseYet
        ));
    }

    #[test]
    fn test_snapshot_restore_carries_wrapper_state() {
        let mut original = session("http://www.example.com");
        original.set_header("X-Test", "1");
        let snapshot = original.backup_session_data();

        let mut other = session("http://other.example.com");
        other.load_session_data(snapshot);
        assert_eq!(other.base_url(), "http://www.example.com");
        assert_eq!(other.client.headers.get("X-Test"), Some(&"1".to_string()));
    }

    #[test]
    fn test_snapshot_shares_underlying_client() {
        let browser = session("http://www.example.com");
        let snapshot = browser.backup_session_data();
        assert!(Arc::ptr_eq(&browser.http, &snapshot.http));
        browser.close_session(snapshot);
    }

    #[test]
    fn test_resolve_rejects_unparsable_page() {
        let mut browser = session("http://www.example.com");
        let err = browser.open("http://").unwrap_err();
        assert!(matches!(err, BrowserError::InvalidPage(_)));
    }
}
