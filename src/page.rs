//! The last-response snapshot.
//!
//! Every request produces a [`Page`]: the final URL, status code, raw body,
//! and the body parsed as an HTML document. Assertions in acceptance tests
//! work against this snapshot rather than the live response object.

use std::sync::LazyLock;

use reqwest::StatusCode;
use scraper::{Html, Selector};
use url::Url;

// CSS selector strings
const TITLE_SELECTOR_STR: &str = "title";

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(TITLE_SELECTOR_STR).expect("Failed to parse title selector - this is a bug")
});

/// A fetched page: final URL, status, raw body, and parsed document.
///
/// The parsed document is not `Send`, which structurally keeps sessions on
/// the thread that created them.
#[derive(Clone, Debug)]
pub struct Page {
    url: Url,
    status: StatusCode,
    body: String,
    document: Html,
}

impl Page {
    /// Builds a page snapshot from response parts, parsing the body as HTML.
    pub(crate) fn new(url: Url, status: StatusCode, body: String) -> Self {
        let document = Html::parse_document(&body);
        Self {
            url,
            status,
            body,
            document,
        }
    }

    /// The final URL after any redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The body parsed as an HTML document.
    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Extracts the page title, trimmed of whitespace.
    ///
    /// Returns `None` if the document has no non-empty `<title>` element.
    pub fn title(&self) -> Option<String> {
        self.document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|element| element.inner_html().trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// The whitespace-normalized text content of the document.
    ///
    /// Useful for "page contains" assertions without caring about markup.
    pub fn text(&self) -> String {
        self.document
            .root_element()
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
