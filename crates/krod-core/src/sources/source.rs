//! Source records and domain display

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// A single cited source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Unique within a message; the citation linker's lookup key
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl Source {
    /// Domain shown on the card
    ///
    /// Uses `domain` when set, otherwise the URL's host. A URL that does not
    /// parse or has no host is shown as-is.
    pub fn display_domain(&self) -> Cow<'_, str> {
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            return Cow::Borrowed(domain);
        }

        match Url::parse(&self.url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) if !host.is_empty() => Cow::Owned(host.to_string()),
                _ => {
                    tracing::debug!(url = %self.url, "Source URL has no host");
                    Cow::Borrowed(self.url.as_str())
                }
            },
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "Malformed source URL");
                Cow::Borrowed(self.url.as_str())
            }
        }
    }
}

/// Parse a JSON array of sources, rejecting duplicate ids
pub fn parse_sources(json: &str) -> Result<Vec<Source>> {
    let sources: Vec<Source> = serde_json::from_str(json)?;
    ensure_unique_ids(&sources)?;
    Ok(sources)
}

pub(crate) fn ensure_unique_ids(sources: &[Source]) -> Result<()> {
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.id.as_str()) {
            return Err(Error::DuplicateSourceId(source.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, domain: Option<&str>) -> Source {
        Source {
            id: "s1".to_string(),
            title: "Title".to_string(),
            url: url.to_string(),
            domain: domain.map(str::to_string),
            snippet: None,
            favicon: None,
        }
    }

    #[test]
    fn test_explicit_domain_wins() {
        let s = source("https://www.example.com/a", Some("example.com"));
        assert_eq!(s.display_domain(), "example.com");
    }

    #[test]
    fn test_domain_from_url() {
        let s = source("https://arxiv.org/abs/1706.03762", None);
        assert_eq!(s.display_domain(), "arxiv.org");
    }

    #[test]
    fn test_empty_domain_falls_back_to_url() {
        let s = source("https://docs.rs/regex", Some(""));
        assert_eq!(s.display_domain(), "docs.rs");
    }

    #[test]
    fn test_malformed_url_shows_raw() {
        let s = source("not a url", None);
        assert_eq!(s.display_domain(), "not a url");
    }

    #[test]
    fn test_hostless_url_shows_raw() {
        let s = source("mailto:someone@example.com", None);
        assert_eq!(s.display_domain(), "mailto:someone@example.com");
    }

    #[test]
    fn test_parse_sources_optional_fields() {
        let json = r#"[
            {"id": "a", "title": "A", "url": "https://a.dev"},
            {"id": "b", "title": "B", "url": "https://b.dev", "snippet": "text"}
        ]"#;
        let sources = parse_sources(json).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].snippet.as_deref(), Some("text"));
        assert!(sources[0].favicon.is_none());
    }

    #[test]
    fn test_parse_sources_rejects_duplicate_ids() {
        let json = r#"[
            {"id": "a", "title": "A", "url": "https://a.dev"},
            {"id": "a", "title": "B", "url": "https://b.dev"}
        ]"#;
        assert!(matches!(
            parse_sources(json),
            Err(Error::DuplicateSourceId(id)) if id == "a"
        ));
    }
}
