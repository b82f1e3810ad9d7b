//! Content URI - addressing for provider operations
//!
//! Format: `<scheme>://<authority>[/<segment>...]`
//!
//! Examples:
//! - `content://me.freewine.winnie/history`
//! - `content://me.freewine.winnie/history/42`

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Parsed content URI.
///
/// Empty path segments are dropped, so `content://a/b/` and `content://a//b`
/// both parse to the segments `["b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    /// URI scheme, without `://`
    pub scheme: String,
    /// Authority owning the namespace
    pub authority: String,
    /// Non-empty path segments
    pub segments: Vec<String>,
}

impl ContentUri {
    /// Create a new ContentUri
    pub fn new<S: Into<String>>(scheme: impl Into<String>, authority: impl Into<String>, segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a URI string into a ContentUri
    ///
    /// Expected format: `<scheme>://<authority>[/<path>]`
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri.split_once("://")
            .ok_or_else(|| Error::InvalidUri(format!("missing scheme separator: {}", uri)))?;

        if scheme.is_empty() {
            return Err(Error::InvalidUri(format!("empty scheme: {}", uri)));
        }

        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, path),
            None => (rest, ""),
        };

        if authority.is_empty() {
            return Err(Error::InvalidUri(format!("empty authority: {}", uri)));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            authority: authority.to_string(),
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    /// Return a copy of this URI with one more path segment
    pub fn with_appended_path(&self, segment: impl fmt::Display) -> Self {
        let mut uri = self.clone();
        uri.segments.push(segment.to_string());
        uri
    }

    /// Last path segment parsed as a row id, if any
    pub fn row_id(&self) -> Option<i64> {
        self.segments.last().and_then(|s| s.parse().ok())
    }

    /// True if `other` equals this URI or lives underneath it
    pub fn is_ancestor_of(&self, other: &ContentUri) -> bool {
        self.scheme == other.scheme
            && self.authority == other.authority
            && other.segments.starts_with(&self.segments)
    }

    /// Convert to URI string
    pub fn to_uri_string(&self) -> String {
        let mut s = format!("{}://{}", self.scheme, self.authority);
        for segment in &self.segments {
            s.push('/');
            s.push_str(segment);
        }
        s
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ContentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ContentUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ContentUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContentUri::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_parse() {
        let uri = ContentUri::parse("content://me.freewine.winnie/history/42").unwrap();
        assert_eq!(uri.scheme, "content");
        assert_eq!(uri.authority, "me.freewine.winnie");
        assert_eq!(uri.segments, vec!["history", "42"]);
        assert_eq!(uri.row_id(), Some(42));
    }

    #[test]
    fn test_append_and_format() {
        let table = ContentUri::parse("content://auth/history").unwrap();
        let row = table.with_appended_path(7);
        assert_eq!(row.to_uri_string(), "content://auth/history/7");
        assert!(table.is_ancestor_of(&row));
        assert!(!row.is_ancestor_of(&table));
    }

    #[test]
    fn test_empty_segments_dropped() {
        let uri = ContentUri::parse("content://auth//history/").unwrap();
        assert_eq!(uri.segments, vec!["history"]);
        assert_eq!(uri.row_id(), None);
    }

    #[test]
    fn test_invalid_uri() {
        assert!(ContentUri::parse("invalid").is_err());
        assert!(ContentUri::parse("://auth/history").is_err());
        assert!(ContentUri::parse("content:///history").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let uri = ContentUri::parse("content://auth/history").unwrap();
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"content://auth/history\"");
        let back: ContentUri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }
}
