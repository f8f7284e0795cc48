//! Client and logger initialization.
//!
//! This module turns a validated [`BrowserConfig`](crate::BrowserConfig)
//! into a configured blocking HTTP client, and provides an opt-in logger
//! setup for suites that want the browser module's log output formatted.
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

// Re-export public API
pub use client::build_http_client;
pub use logger::init_logger_with;
