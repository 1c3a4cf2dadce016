//! Remote content gateway contract.
//!
//! The gateway performs the actual remote reads and writes of member
//! content and attribute queries. It is owned by the connection layer; the
//! provider only depends on this trait. All operations are identity-based
//! and stateless between calls, which keeps the contract RPC-friendly.

mod memory;

pub use memory::MemoryGateway;

use async_trait::async_trait;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use qsysfs_types::MemberIdentity;

use crate::error::FsResult;

/// Attributes the host reports for a member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberAttributes {
    /// Creation timestamp.
    pub created: SystemTime,
    /// Last change timestamp.
    pub changed: SystemTime,
    /// Data size in bytes.
    pub size: u64,
}

/// One source record: a line of member text plus its per-record metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Record sequence number.
    pub sequence: u32,
    /// Source date as a six-digit YYMMDD value; 0 when the record has none.
    pub date: u32,
    /// The record text, without trailing newline.
    pub text: String,
}

impl SourceRecord {
    /// Build a record.
    pub fn new(sequence: u32, date: u32, text: impl Into<String>) -> Self {
        Self {
            sequence,
            date,
            text: text.into(),
        }
    }
}

/// Remote content and attribute operations for member objects.
///
/// Returning `Ok(None)` from a query means the host answered and the
/// object (or the requested detail) does not exist; `Err` means the call
/// itself failed.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Query member attributes. `None` means the member does not exist.
    async fn attributes(&self, identity: &MemberIdentity) -> FsResult<Option<MemberAttributes>>;

    /// Download raw member content. `None` means no content was returned.
    async fn download(&self, identity: &MemberIdentity) -> FsResult<Option<String>>;

    /// Upload raw member content.
    async fn upload(&self, identity: &MemberIdentity, content: &str) -> FsResult<()>;

    /// Download member content with per-record source dates. `None` means
    /// the record-level query produced nothing for this member.
    async fn download_with_dates(
        &self,
        identity: &MemberIdentity,
    ) -> FsResult<Option<Vec<SourceRecord>>>;

    /// Upload member content as structured records, dates included.
    async fn upload_with_dates(
        &self,
        identity: &MemberIdentity,
        records: &[SourceRecord],
    ) -> FsResult<()>;
}
