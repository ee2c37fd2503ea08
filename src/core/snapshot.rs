//! Page snapshot data model
//!
//! An immutable record of a fetched page: final URL, status code, response
//! headers, and the serialized HTML. Constructed exactly once per fetch call
//! and never mutated afterward; the structural DOM handle is derived from the
//! stored HTML on demand so the snapshot itself stays `Send`.

use serde::{Deserialize, Serialize};

use crate::core::error::{FetchError, Result};

/// Ordered multimap of response headers with case-insensitive keys.
///
/// Insertion order of first appearance is preserved, as is the casing of the
/// first occurrence of each key. Repeated headers (`Set-Cookie` in practice)
/// accumulate into a list under one key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageHeaders {
    entries: Vec<(String, Vec<String>)>,
}

impl PageHeaders {
    /// Create an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header value, merging with an existing key case-insensitively
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some((_, values)) = self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            values.push(value);
        } else {
            self.entries.push((name, vec![value]));
        }
    }

    /// First value for a key, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }

    /// All values recorded for a key
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct header keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headers were recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (key, values) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Immutable record of a fetched page at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status of the navigation response
    pub status_code: u16,
    /// Response headers, Set-Cookie preserved as a list
    pub headers: PageHeaders,
    /// Full serialized HTML (non-empty by construction)
    pub html: String,
}

impl PageSnapshot {
    /// Build a snapshot, validating the HTML invariants.
    ///
    /// The HTML must be non-empty after trimming and must parse into a
    /// structural handle; construction is all-or-nothing.
    pub fn new(
        url: impl Into<String>,
        status_code: u16,
        headers: PageHeaders,
        html: impl Into<String>,
    ) -> Result<Self> {
        let html = html.into();
        if html.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        let snapshot = Self {
            url: url.into(),
            status_code,
            headers,
            html,
        };
        // Derive the DOM once up front so a snapshot without a valid
        // structural handle is never handed to a caller.
        snapshot.parsed_document()?;
        Ok(snapshot)
    }

    /// Derive the structural DOM handle from exactly this snapshot's HTML
    pub fn parsed_document(&self) -> Result<scraper::Html> {
        let document = scraper::Html::parse_document(&self.html);
        if document.root_element().children().next().is_none() {
            return Err(FetchError::DomParse(
                "document has no parseable content".to_string(),
            ));
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive_get() {
        let mut headers = PageHeaders::new();
        headers.append("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn test_headers_set_cookie_accumulates() {
        let mut headers = PageHeaders::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("set-cookie", "b=2");
        headers.append("Content-Length", "42");

        assert_eq!(headers.get_all("set-cookie"), &["a=1", "b=2"]);
        assert_eq!(headers.get_all("content-length"), &["42"]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_headers_preserve_insertion_order() {
        let mut headers = PageHeaders::new();
        headers.append("B", "2");
        headers.append("A", "1");
        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn test_snapshot_rejects_empty_html() {
        let result = PageSnapshot::new("https://example.com", 200, PageHeaders::new(), "   ");
        assert!(matches!(result, Err(FetchError::EmptyBody)));
    }

    #[test]
    fn test_snapshot_parses_document() {
        let snapshot = PageSnapshot::new(
            "https://example.com",
            200,
            PageHeaders::new(),
            "<html><body><h1>Hi</h1></body></html>",
        )
        .unwrap();

        let document = snapshot.parsed_document().unwrap();
        let selector = scraper::Selector::parse("h1").unwrap();
        let heading: Vec<_> = document.select(&selector).collect();
        assert_eq!(heading.len(), 1);
    }
}
