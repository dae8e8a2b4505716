//! URL composition
//!
//! Joins a base URL with path parts, accumulates (possibly repeated) query
//! parameters in insertion order, and supports appending a path suffix such
//! as a record id.

use crate::error::Result;
use std::fmt;
use url::Url;

/// Mutable URL under construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    url: Url,
    query: Vec<(String, String)>,
}

impl UrlBuilder {
    /// Join a base URL and path parts with single slashes
    ///
    /// Empty parts are skipped, so `new(base, &["", "contacts"])` works for
    /// providers without a module path.
    pub fn new(base: &str, parts: &[&str]) -> Result<Self> {
        let mut joined = base.trim_end_matches('/').to_string();
        for part in parts {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                joined.push('/');
                joined.push_str(part);
            }
        }
        Self::parse(&joined)
    }

    /// Start from an absolute URL, keeping its existing query parameters
    pub fn parse(url: &str) -> Result<Self> {
        let mut url = Url::parse(url)?;
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.set_query(None);
        Ok(Self { url, query })
    }

    /// Set a query parameter, replacing previous values for the key
    pub fn with_query(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.remove_query(key);
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Set a query parameter to several values (`?k=a&k=b`)
    pub fn with_query_values<I, S>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove_query(key);
        for value in values {
            self.query.push((key.to_string(), value.into()));
        }
        self
    }

    /// Append a query parameter without touching existing values
    pub fn append_query(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Drop every value of a query parameter
    pub fn remove_query(&mut self, key: &str) -> &mut Self {
        self.query.retain(|(k, _)| k != key);
        self
    }

    /// First value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append a suffix to the path (`/contacts` + `123` → `/contacts/123`)
    pub fn add_path(&mut self, suffix: &str) -> &mut Self {
        let suffix = suffix.trim_matches('/');
        if suffix.is_empty() {
            return self;
        }
        let path = format!("{}/{suffix}", self.url.path().trim_end_matches('/'));
        self.url.set_path(&path);
        self
    }

    /// Finished URL
    pub fn to_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        url
    }
}

impl fmt::Display for UrlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_url().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_parts() {
        let url = UrlBuilder::new("https://api.example.com/", &["/v2/", "", "contacts"]).unwrap();
        assert_eq!(url.to_string(), "https://api.example.com/v2/contacts");
    }

    #[test]
    fn test_query_accumulation() {
        let mut url = UrlBuilder::new("https://api.example.com", &["contacts"]).unwrap();
        url.with_query("limit", "100")
            .with_query_values("fields", ["id", "name"])
            .with_query("limit", "50");
        assert_eq!(
            url.to_string(),
            "https://api.example.com/contacts?fields=id&fields=name&limit=50"
        );
        assert_eq!(url.query_value("limit"), Some("50"));
    }

    #[test]
    fn test_parse_keeps_query() {
        let mut url = UrlBuilder::parse("https://host/contacts?page=2&q=a+b").unwrap();
        assert_eq!(url.query_value("q"), Some("a b"));
        url.with_query("page", "3");
        assert_eq!(url.to_string(), "https://host/contacts?q=a+b&page=3");
    }

    #[test]
    fn test_add_path() {
        let mut url = UrlBuilder::new("https://api.example.com", &["contacts"]).unwrap();
        url.add_path("123").append_query("x", "1");
        assert_eq!(url.to_string(), "https://api.example.com/contacts/123?x=1");
    }

    #[test]
    fn test_invalid_base() {
        assert!(UrlBuilder::new("not a url", &["x"]).is_err());
    }
}
