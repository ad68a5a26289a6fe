//! Package locators - WHERE a package is fetched from.
//!
//! A locator is a user-supplied address such as `example.org/pkg` or
//! `https://example.org/pkg`. It is split the way a URL splitter would
//! (scheme, host, path) and then resolved against a default scheme.
//! Only the path participates in the store layout; the host only shapes
//! the remote URL handed to the clone transport.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::errors::StoreError;

/// Scheme used when a locator does not carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(format!(
                "invalid scheme '{}'; expected 'http' or 'https'",
                s
            )),
        }
    }
}

/// A package address as typed by the user, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocator {
    raw: String,
    scheme: String,
    host: String,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl PackageLocator {
    /// Split a locator into scheme, host and path.
    ///
    /// Never fails: anything that is not a scheme or a `//host` prefix ends
    /// up in the path, so `example.org/pkg` has an empty scheme and host.
    pub fn parse(input: &str) -> Self {
        let raw = input.trim().to_string();
        let mut rest = raw.as_str();

        let (rest_no_fragment, fragment) = match rest.split_once('#') {
            Some((head, frag)) => (head, Some(frag.to_string())),
            None => (rest, None),
        };
        rest = rest_no_fragment;

        let (rest_no_query, query) = match rest.split_once('?') {
            Some((head, q)) => (head, Some(q.to_string())),
            None => (rest, None),
        };
        rest = rest_no_query;

        let mut scheme = String::new();
        if let Some((candidate, tail)) = rest.split_once(':') {
            if is_scheme(candidate) {
                scheme = candidate.to_lowercase();
                rest = tail;
            }
        }

        let mut host = String::new();
        if let Some(after) = rest.strip_prefix("//") {
            match after.find('/') {
                Some(idx) => {
                    host = after[..idx].to_string();
                    rest = &after[idx..];
                }
                None => {
                    host = after.to_string();
                    rest = "";
                }
            }
        }

        PackageLocator {
            raw: raw.clone(),
            scheme,
            host,
            path: rest.to_string(),
            query,
            fragment,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The locator exactly as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Reassemble the split parts into a URL string.
    pub fn to_url_string(&self) -> String {
        let mut url = String::new();
        if !self.scheme.is_empty() {
            url.push_str(&self.scheme);
            url.push(':');
        }
        if !self.host.is_empty() || !self.scheme.is_empty() {
            url.push_str("//");
            url.push_str(&self.host);
        }
        url.push_str(&self.path);
        if let Some(ref query) = self.query {
            url.push('?');
            url.push_str(query);
        }
        if let Some(ref fragment) = self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

impl fmt::Display for PackageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A locator with its scheme filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocator {
    inner: PackageLocator,
}

impl ResolvedLocator {
    pub fn scheme(&self) -> &str {
        &self.inner.scheme
    }

    pub fn host(&self) -> &str {
        &self.inner.host
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// `host` + `path`, the form used in user-facing messages.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.inner.host, self.inner.path)
    }

    /// Store-relative destination: the path with its leading separators stripped.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.inner.path.trim_start_matches('/'))
    }

    /// The URL handed to the clone transport.
    pub fn remote_url(&self) -> String {
        self.inner.to_url_string()
    }

    /// Validate the remote URL before any transfer is attempted.
    pub fn validated_url(&self) -> Result<Url> {
        let url_str = self.remote_url();
        Url::parse(&url_str).map_err(|e| {
            anyhow::Error::from(StoreError::InvalidLocator {
                locator: url_str.clone(),
                reason: e.to_string(),
            })
        })
    }
}

/// Resolve a locator against a default scheme.
///
/// Returns `None` when the locator has neither a host nor a path; callers
/// treat that as a no-op rather than an error.
pub fn resolve(locator: &PackageLocator, default_scheme: Scheme) -> Option<ResolvedLocator> {
    let resolved = if locator.scheme.is_empty() {
        PackageLocator::parse(&format!(
            "{}://{}",
            default_scheme.as_str(),
            locator.to_url_string()
        ))
    } else {
        locator.clone()
    };

    if resolved.host.is_empty() && resolved.path.is_empty() {
        return None;
    }

    Some(ResolvedLocator { inner: resolved })
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_scheme() {
        let loc = PackageLocator::parse("example.org/pkg");
        assert_eq!(loc.scheme(), "");
        assert_eq!(loc.host(), "");
        assert_eq!(loc.path(), "example.org/pkg");
    }

    #[test]
    fn test_parse_full_url() {
        let loc = PackageLocator::parse("https://example.org/org/pkg.git");
        assert_eq!(loc.scheme(), "https");
        assert_eq!(loc.host(), "example.org");
        assert_eq!(loc.path(), "/org/pkg.git");
    }

    #[test]
    fn test_parse_file_url() {
        let loc = PackageLocator::parse("file:///srv/repos/pkg");
        assert_eq!(loc.scheme(), "file");
        assert_eq!(loc.host(), "");
        assert_eq!(loc.path(), "/srv/repos/pkg");
        assert_eq!(loc.to_url_string(), "file:///srv/repos/pkg");
    }

    #[test]
    fn test_resolve_substitutes_default_scheme() {
        for default in [Scheme::Http, Scheme::Https] {
            let loc = PackageLocator::parse("example.org/pkg");
            let resolved = resolve(&loc, default).unwrap();
            assert_eq!(resolved.scheme(), default.as_str());
            assert_eq!(resolved.host(), "example.org");
            assert_eq!(resolved.path(), "/pkg");
            assert_eq!(
                resolved.remote_url(),
                format!("{}://example.org/pkg", default)
            );
        }
    }

    #[test]
    fn test_resolve_preserves_explicit_scheme() {
        for input in [
            "http://example.org/pkg",
            "ssh://git@example.org/pkg",
            "file:///srv/pkg",
        ] {
            let loc = PackageLocator::parse(input);
            let resolved = resolve(&loc, Scheme::Https).unwrap();
            assert_eq!(resolved.scheme(), loc.scheme());
            assert_eq!(resolved.remote_url(), input);
        }
    }

    #[test]
    fn test_resolve_empty_locator_is_none() {
        assert!(resolve(&PackageLocator::parse(""), Scheme::Https).is_none());
        assert!(resolve(&PackageLocator::parse("https://"), Scheme::Https).is_none());
    }

    #[test]
    fn test_relative_path_strips_leading_separator() {
        let loc = PackageLocator::parse("https://example.org/org/pkg");
        let resolved = resolve(&loc, Scheme::Https).unwrap();
        assert_eq!(resolved.relative_path(), PathBuf::from("org/pkg"));
        assert_eq!(resolved.display_name(), "example.org/org/pkg");
    }

    #[test]
    fn test_query_and_fragment_excluded_from_path() {
        let loc = PackageLocator::parse("https://example.org/pkg?ref=main#readme");
        let resolved = resolve(&loc, Scheme::Https).unwrap();
        assert_eq!(resolved.relative_path(), PathBuf::from("pkg"));
        assert_eq!(
            resolved.remote_url(),
            "https://example.org/pkg?ref=main#readme"
        );
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("HTTP".parse::<Scheme>().unwrap(), Scheme::Http);
        assert_eq!("https".parse::<Scheme>().unwrap(), Scheme::Https);
        assert!("ftp".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_validated_url_rejects_garbage() {
        let loc = PackageLocator::parse("https://exa mple.org/pkg");
        let resolved = resolve(&loc, Scheme::Https).unwrap();
        assert!(resolved.validated_url().is_err());
    }
}
