//! File attributes surfaced to the editor.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// File kind. Member paths deeper than a source physical file are files;
/// everything above them presents as a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// A member, presented as a regular file.
    File,
    /// A library or source physical file level, presented as a directory.
    Directory,
}

impl FileKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileKind::Directory)
    }
}

/// File attributes (metadata) for a member or container level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttr {
    /// Creation time.
    pub ctime: SystemTime,
    /// Last change time.
    pub mtime: SystemTime,
    /// Data size in bytes.
    pub size: u64,
    /// File or directory.
    pub kind: FileKind,
    /// Presented permission: true forces read-only regardless of remote ACLs.
    pub readonly: bool,
}

impl FileAttr {
    /// Attributes for a member with known remote metadata.
    pub fn member(ctime: SystemTime, mtime: SystemTime, size: u64) -> Self {
        Self {
            ctime,
            mtime,
            size,
            kind: FileKind::File,
            readonly: false,
        }
    }

    /// Zeroed placeholder attributes, used when no live session exists.
    pub fn placeholder(kind: FileKind) -> Self {
        Self {
            ctime: SystemTime::UNIX_EPOCH,
            mtime: SystemTime::UNIX_EPOCH,
            size: 0,
            kind,
            readonly: false,
        }
    }

    /// Directory-level attributes (libraries and source physical files).
    pub fn directory() -> Self {
        Self::placeholder(FileKind::Directory)
    }

    /// Set the presented read-only flag.
    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}
