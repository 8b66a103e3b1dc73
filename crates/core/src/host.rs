//! Host names and the per-host record produced by a pipeline run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Maximum length of a host name, in characters.
pub const MAX_HOST_LEN: usize = 320;

/// Strip trailing dots and lowercase a domain.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}

/// A validated host name.
///
/// Trimmed, non-empty, at most [`MAX_HOST_LEN`] characters, lowercase and
/// without a trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Host(String);

impl Host {
    /// Validate and normalize a host name.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let normalized = normalize_domain(input);

        if normalized.is_empty() {
            return Err(Error::InvalidHost("host cannot be empty".into()));
        }
        if normalized.chars().count() > MAX_HOST_LEN {
            return Err(Error::InvalidHost(format!("host exceeds {MAX_HOST_LEN} characters")));
        }
        if normalized.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(Error::InvalidHost(format!("invalid character in {normalized:?}")));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this host is `domain` itself or one of its subdomains.
    pub fn is_within(&self, domain: &str) -> bool {
        self.0 == domain || self.0.strip_suffix(domain).is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Host {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Host {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Host::parse(&value)
    }
}

impl From<Host> for String {
    fn from(host: Host) -> Self {
        host.0
    }
}

/// Metadata scraped from a page, every field optional.
///
/// Absence is the only "missing" state: extractors never produce empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One listed host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HostRecord {
    pub host: Host,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl HostRecord {
    /// A record with no metadata.
    pub fn bare(host: Host) -> Self {
        Self { host, name: None, description: None, icon: None }
    }

    pub fn from_metadata(host: Host, metadata: PageMetadata, icon: Option<String>) -> Self {
        Self { host, name: metadata.title, description: metadata.description, icon }
    }

    /// Only records carrying a name or a description are listed.
    pub fn is_listable(&self) -> bool {
        self.name.is_some() || self.description.is_some()
    }
}

/// Trim `value` and drop it when nothing is left.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("Example.COM.."), "example.com");
        assert_eq!(normalize_domain("  example.com  "), "example.com");
    }

    #[test]
    fn test_host_parse_normalizes() {
        let host = Host::parse(" API.Example.com. ").unwrap();
        assert_eq!(host.as_str(), "api.example.com");
    }

    #[test]
    fn test_host_parse_rejects_empty() {
        assert!(matches!(Host::parse("   "), Err(Error::InvalidHost(_))));
        assert!(matches!(Host::parse("..."), Err(Error::InvalidHost(_))));
    }

    #[test]
    fn test_host_parse_rejects_too_long() {
        let long = "a".repeat(MAX_HOST_LEN + 1);
        assert!(Host::parse(&long).is_err());
        assert!(Host::parse(&"a".repeat(MAX_HOST_LEN)).is_ok());
    }

    #[test]
    fn test_host_parse_rejects_inner_whitespace() {
        assert!(Host::parse("api example.com").is_err());
    }

    #[test]
    fn test_is_within() {
        let host = Host::parse("api.example.com").unwrap();
        assert!(host.is_within("example.com"));
        assert!(!host.is_within("le.com"));
        assert!(Host::parse("example.com").unwrap().is_within("example.com"));
        assert!(!Host::parse("badexample.com").unwrap().is_within("example.com"));
    }

    #[test]
    fn test_record_serializes_without_absent_fields() {
        let record = HostRecord {
            host: Host::parse("api.example.com").unwrap(),
            name: Some("API".into()),
            description: None,
            icon: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "host": "api.example.com", "name": "API" }));
    }

    #[test]
    fn test_is_listable() {
        let host = Host::parse("a.example.com").unwrap();
        assert!(!HostRecord::bare(host.clone()).is_listable());
        let described = HostRecord { description: Some("d".into()), ..HostRecord::bare(host) };
        assert!(described.is_listable());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  hi "), Some("hi".to_string()));
        assert_eq!(non_empty(" \n "), None);
    }
}
