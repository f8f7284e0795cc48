//! http_browser: a cookie-aware, JavaScript-free HTTP browser for web acceptance tests
//!
//! This library wraps a blocking `reqwest` client behind a small "browser"
//! abstraction suited to acceptance-test suites: a declarative configuration
//! map is turned into a fully configured HTTP client, requests carry a set of
//! default headers and a per-session cookie jar, and the last fetched page is
//! kept around (status code plus parsed document) for assertions.
//!
//! Multi-session test scenarios are supported through an explicit
//! snapshot/restore cycle: [`BrowserSession::backup_session_data`] captures the
//! live client, underlying HTTP client, and last page into a
//! [`SessionSnapshot`], and [`BrowserSession::load_session_data`] swaps them
//! back in on any session built from a compatible configuration.
//!
//! # Example
//!
//! ```no_run
//! use http_browser::{BrowserConfig, BrowserSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BrowserConfig {
//!     url: "http://localhost:8000".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut browser = BrowserSession::new(config)?;
//! browser.before_test()?;
//! browser.open("/")?;
//! assert_eq!(browser.last_status_code()?, 200);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! All operations are synchronous and block the calling test until the
//! transport call completes. Sessions are single-threaded by construction;
//! do not drive one session (or a session and its snapshot) from multiple
//! threads concurrently.

#![warn(missing_docs)]

mod browser;
pub mod config;
mod error_handling;
pub mod initialization;
mod page;
mod subdomain;
mod transport;

// Re-export public API
pub use browser::{BrowserSession, SessionSnapshot};
pub use config::{BasicAuth, BrowserConfig, HttpVersion, LogFormat, LogLevel};
pub use error_handling::{BrowserError, ConfigurationError};
pub use page::Page;
pub use transport::TransportFlag;
