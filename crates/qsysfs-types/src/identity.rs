//! Host object identity: `[asp/]library/file/member.extension`.
//!
//! An identity is immutable once constructed. Two identities are equal iff
//! their canonical strings match case-sensitively; the host's own
//! case-folding rules are applied upstream by whoever builds the path.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a member path into an identity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Wrong number of path segments (expected 3, or 4 with an ASP).
    #[error("invalid member path: {0}")]
    InvalidPath(String),

    /// A path segment was empty.
    #[error("empty segment in member path: {0}")]
    EmptySegment(String),
}

/// A member object on the host.
///
/// The canonical string form is `[asp/]library/file/member.extension`,
/// without a leading separator. The extension may be empty (members with
/// no source type render as `member.`-less, i.e. just `member`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct MemberIdentity {
    /// Auxiliary storage pool qualifier, if the library lives off-system.
    pub asp: Option<String>,
    /// Containing library.
    pub library: String,
    /// Containing source physical file.
    pub file: String,
    /// Member name, without extension.
    pub member: String,
    /// Member extension (source type), possibly empty.
    pub extension: String,
}

impl MemberIdentity {
    /// Build an identity from its parts.
    pub fn new(
        asp: Option<impl Into<String>>,
        library: impl Into<String>,
        file: impl Into<String>,
        member: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            asp: asp.map(Into::into),
            library: library.into(),
            file: file.into(),
            member: member.into(),
            extension: extension.into(),
        }
    }

    /// Parse the canonical path form, with or without a leading `/`.
    ///
    /// Three segments parse as `library/file/member.extension`; four as
    /// `asp/library/file/member.extension`. The final segment splits at
    /// its last `.`; a segment without a dot yields an empty extension.
    pub fn parse(path: &str) -> Result<Self, IdentityError> {
        let trimmed = path.trim_start_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(IdentityError::EmptySegment(path.to_string()));
        }

        let (asp, library, file, name) = match segments.as_slice() {
            [library, file, name] => (None, *library, *file, *name),
            [asp, library, file, name] => (Some(asp.to_string()), *library, *file, *name),
            _ => return Err(IdentityError::InvalidPath(path.to_string())),
        };

        let (member, extension) = match name.rsplit_once('.') {
            Some((member, extension)) => (member, extension),
            None => (name, ""),
        };
        if member.is_empty() {
            return Err(IdentityError::EmptySegment(path.to_string()));
        }

        Ok(Self::new(asp, library, file, member, extension))
    }

    /// The canonical string form, no leading separator.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        if let Some(asp) = &self.asp {
            out.push_str(asp);
            out.push('/');
        }
        out.push_str(&self.library);
        out.push('/');
        out.push_str(&self.file);
        out.push('/');
        out.push_str(&self.member);
        if !self.extension.is_empty() {
            out.push('.');
            out.push_str(&self.extension);
        }
        out
    }
}

impl fmt::Display for MemberIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
