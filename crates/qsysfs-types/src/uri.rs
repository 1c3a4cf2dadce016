//! Resource URI codec.
//!
//! The editor addresses remote objects through opaque identifiers:
//! a scheme (member object vs. IFS stream file), a path, and an options
//! query string. Options round-trip through the codec; the identity itself
//! round-trips only as the canonical path string. Parsing library/file/
//! member back out is [`MemberIdentity::parse`]'s job.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::MemberIdentity;

/// Error decoding a resource URI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    /// No `scheme:` prefix.
    #[error("missing scheme: {0}")]
    MissingScheme(String),

    /// Scheme is neither `member` nor `streamfile`.
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    /// Stream file paths must be absolute.
    #[error("stream file path is not absolute: {0}")]
    RelativePath(String),
}

/// Identifier scheme.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum UriScheme {
    /// Library/file/member object, path = `/` + canonical identity string.
    Member,
    /// IFS stream file, path = absolute host path.
    Streamfile,
}

/// Per-resource options carried in the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOptions {
    /// Force the presented permission to read-only.
    pub readonly: bool,
}

impl FileOptions {
    /// Read-only options.
    pub fn readonly() -> Self {
        Self { readonly: true }
    }

    /// Serialize as a query string.
    pub fn to_query(self) -> String {
        format!("readonly={}", self.readonly)
    }

    /// Parse from a query string. Malformed or absent values decode to
    /// `false` rather than failing.
    pub fn from_query(query: &str) -> Self {
        let readonly = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "readonly")
            .and_then(|(_, value)| value.parse::<bool>().ok())
            .unwrap_or(false);
        Self { readonly }
    }
}

/// An opaque resource identifier: scheme + path + options query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUri {
    /// Identifier scheme.
    pub scheme: UriScheme,
    /// Path: `/` + canonical identity for members, absolute host path for
    /// stream files.
    pub path: String,
    /// Options query string.
    pub query: String,
}

impl ResourceUri {
    /// Encode a member identity.
    pub fn member(identity: &MemberIdentity, options: FileOptions) -> Self {
        Self {
            scheme: UriScheme::Member,
            path: format!("/{}", identity.canonical()),
            query: options.to_query(),
        }
    }

    /// Encode an absolute stream file path.
    pub fn streamfile(path: impl Into<String>, options: FileOptions) -> Result<Self, UriError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(UriError::RelativePath(path));
        }
        Ok(Self {
            scheme: UriScheme::Streamfile,
            path,
            query: options.to_query(),
        })
    }

    /// Decode the options query string.
    pub fn options(&self) -> FileOptions {
        FileOptions::from_query(&self.query)
    }

    /// Raw `/`-separated segment count of the path, leading separator
    /// included as an empty first segment. Paths with more than three
    /// segments address a member (a file); shallower paths address a
    /// container level (a directory).
    pub fn segment_count(&self) -> usize {
        self.path.split('/').count()
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}:{}", self.scheme, self.path)
        } else {
            write!(f, "{}:{}?{}", self.scheme, self.path, self.query)
        }
    }
}

impl FromStr for ResourceUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s
            .split_once(':')
            .ok_or_else(|| UriError::MissingScheme(s.to_string()))?;
        let scheme = scheme
            .parse::<UriScheme>()
            .map_err(|_| UriError::UnknownScheme(scheme.to_string()))?;
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (rest.to_string(), String::new()),
        };
        Ok(Self {
            scheme,
            path,
            query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> MemberIdentity {
        MemberIdentity::parse("MYLIB/MYFILE/MEMBER1.RPGLE").unwrap()
    }

    #[test]
    fn test_member_uri_shape() {
        let uri = ResourceUri::member(&identity(), FileOptions::default());
        assert_eq!(uri.scheme, UriScheme::Member);
        assert_eq!(uri.path, "/MYLIB/MYFILE/MEMBER1.RPGLE");
        assert_eq!(uri.to_string(), "member:/MYLIB/MYFILE/MEMBER1.RPGLE?readonly=false");
    }

    #[test]
    fn test_streamfile_requires_absolute_path() {
        assert!(ResourceUri::streamfile("/home/user/test.txt", FileOptions::default()).is_ok());
        assert!(matches!(
            ResourceUri::streamfile("relative.txt", FileOptions::default()),
            Err(UriError::RelativePath(_))
        ));
    }

    #[test]
    fn test_options_round_trip() {
        for readonly in [true, false] {
            let options = FileOptions { readonly };
            let uri = ResourceUri::member(&identity(), options);
            assert_eq!(uri.options(), options);
        }
    }

    #[test]
    fn test_malformed_readonly_decodes_false() {
        assert!(!FileOptions::from_query("readonly=banana").readonly);
        assert!(!FileOptions::from_query("readonly").readonly);
        assert!(!FileOptions::from_query("").readonly);
        assert!(FileOptions::from_query("other=1&readonly=true").readonly);
    }

    #[test]
    fn test_parse_display_round_trip() {
        let uri: ResourceUri = "member:/MYLIB/MYFILE/MEMBER1.RPGLE?readonly=true"
            .parse()
            .unwrap();
        assert_eq!(uri.scheme, UriScheme::Member);
        assert!(uri.options().readonly);
        assert_eq!(uri.to_string().parse::<ResourceUri>().unwrap(), uri);

        let bare: ResourceUri = "member:/MYLIB/MYFILE/MEMBER1.RPGLE".parse().unwrap();
        assert!(!bare.options().readonly);
    }

    #[test]
    fn test_parse_rejects_bad_scheme() {
        assert!(matches!(
            "ftp:/x".parse::<ResourceUri>(),
            Err(UriError::UnknownScheme(_))
        ));
        assert!(matches!(
            "no-scheme-here".parse::<ResourceUri>(),
            Err(UriError::MissingScheme(_))
        ));
    }

    #[test]
    fn test_segment_count_classification() {
        let file: ResourceUri = "member:/MYLIB/MYFILE/MEMBER1.RPGLE".parse().unwrap();
        assert!(file.segment_count() > 3);

        let dir: ResourceUri = "member:/MYLIB/MYFILE".parse().unwrap();
        assert!(dir.segment_count() <= 3);
    }
}
