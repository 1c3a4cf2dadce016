//! Provider error types.

use std::io;

use thiserror::Error;

use qsysfs_types::IdentityError;

/// Filesystem provider error type.
#[derive(Debug, Error)]
pub enum FsError {
    /// Object confirmed absent: the remote query returned nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// No live session, and for reads, reconnection also failed.
    #[error("not connected: {0}")]
    NotConnected(String),

    /// Gateway download/upload failed for a reason other than absence.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Operation is owned by an external component, unconditionally.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Path does not address a member.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] IdentityError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a NotConnected error.
    pub fn not_connected(msg: impl Into<String>) -> Self {
        Self::NotConnected(msg.into())
    }

    /// Create a TransferFailed error.
    pub fn transfer_failed(msg: impl Into<String>) -> Self {
        Self::TransferFailed(msg.into())
    }

    /// Create a NotImplemented error.
    pub fn not_implemented(op: impl Into<String>) -> Self {
        Self::NotImplemented(op.into())
    }
}

/// Convert FsError to std::io::Error for embedding hosts.
impl From<FsError> for io::Error {
    fn from(e: FsError) -> Self {
        match e {
            FsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            FsError::NotConnected(msg) => io::Error::new(io::ErrorKind::NotConnected, msg),
            FsError::TransferFailed(msg) => io::Error::other(msg),
            FsError::NotImplemented(msg) => io::Error::new(io::ErrorKind::Unsupported, msg),
            FsError::InvalidPath(e) => io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
            FsError::Io(e) => e,
        }
    }
}

/// Provider result type.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_bridge_preserves_kind() {
        let e: io::Error = FsError::not_found("MYLIB/MYFILE/A.RPGLE").into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);

        let e: io::Error = FsError::not_implemented("readDirectory").into();
        assert_eq!(e.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_identity_error_wraps() {
        let err = qsysfs_types::MemberIdentity::parse("TOO/SHALLOW").unwrap_err();
        let e = FsError::from(err);
        assert!(matches!(e, FsError::InvalidPath(_)));
    }
}
