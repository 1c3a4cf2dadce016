//! # qsysfs-types
//!
//! Shared identity and metadata types for the qsysfs member filesystem
//! bridge:
//!
//! - [`MemberIdentity`] - a library/file/member object on the host, with
//!   optional auxiliary storage pool qualifier
//! - [`FileAttr`] / [`FileKind`] - the attribute model surfaced to the
//!   editor
//! - [`ResourceUri`] - the opaque identifier the editor hands back to the
//!   provider, carrying the scheme and per-resource options
//!
//! These types are wire-adjacent: identities are opaque on the editor side
//! (only the canonical string travels) and all types serialize with serde.

mod attr;
mod identity;
mod uri;

pub use attr::{FileAttr, FileKind};
pub use identity::{IdentityError, MemberIdentity};
pub use uri::{FileOptions, ResourceUri, UriError, UriScheme};
