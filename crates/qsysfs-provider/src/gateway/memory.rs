//! In-memory content gateway.
//!
//! Backs the test suite and offline development. Members are keyed by
//! canonical identity string; call counters let tests assert how many
//! round-trips an operation really issued.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use dashmap::DashMap;

use qsysfs_types::MemberIdentity;

use super::{ContentGateway, MemberAttributes, SourceRecord};
use crate::error::FsResult;

/// A stored member.
#[derive(Debug, Clone)]
struct StoredMember {
    created: SystemTime,
    changed: SystemTime,
    records: Vec<SourceRecord>,
}

impl StoredMember {
    fn text(&self) -> String {
        let lines: Vec<&str> = self.records.iter().map(|r| r.text.as_str()).collect();
        lines.join("\n")
    }

    fn size(&self) -> u64 {
        self.text().len() as u64
    }
}

fn records_from_text(content: &str) -> Vec<SourceRecord> {
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| SourceRecord::new((i + 1) as u32, 0, line))
        .collect()
}

/// In-memory gateway backend.
///
/// Thread-safe via `DashMap`. All data is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    members: DashMap<String, StoredMember>,
    attribute_queries: AtomicU64,
    plain_downloads: AtomicU64,
    plain_uploads: AtomicU64,
    dated_downloads: AtomicU64,
    dated_uploads: AtomicU64,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a member with plain text content (records carry date 0).
    pub fn put_member(&self, identity: &MemberIdentity, content: &str) {
        self.put_member_records(identity, records_from_text(content));
    }

    /// Seed a member with explicit records.
    pub fn put_member_records(&self, identity: &MemberIdentity, records: Vec<SourceRecord>) {
        let now = SystemTime::now();
        self.members.insert(
            identity.canonical(),
            StoredMember {
                created: now,
                changed: now,
                records,
            },
        );
    }

    /// Remove a member.
    pub fn remove_member(&self, identity: &MemberIdentity) {
        self.members.remove(&identity.canonical());
    }

    /// Current raw text of a member, if it exists.
    pub fn member_text(&self, identity: &MemberIdentity) -> Option<String> {
        self.members.get(&identity.canonical()).map(|m| m.text())
    }

    /// Current records of a member, if it exists.
    pub fn member_records(&self, identity: &MemberIdentity) -> Option<Vec<SourceRecord>> {
        self.members
            .get(&identity.canonical())
            .map(|m| m.records.clone())
    }

    /// Number of attribute queries issued so far.
    pub fn attribute_queries(&self) -> u64 {
        self.attribute_queries.load(Ordering::Relaxed)
    }

    /// Number of plain (date-less) downloads issued so far.
    pub fn plain_downloads(&self) -> u64 {
        self.plain_downloads.load(Ordering::Relaxed)
    }

    /// Number of plain (date-less) uploads issued so far.
    pub fn plain_uploads(&self) -> u64 {
        self.plain_uploads.load(Ordering::Relaxed)
    }

    /// Number of record-level downloads issued so far.
    pub fn dated_downloads(&self) -> u64 {
        self.dated_downloads.load(Ordering::Relaxed)
    }

    /// Number of record-level uploads issued so far.
    pub fn dated_uploads(&self) -> u64 {
        self.dated_uploads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ContentGateway for MemoryGateway {
    async fn attributes(&self, identity: &MemberIdentity) -> FsResult<Option<MemberAttributes>> {
        self.attribute_queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.members.get(&identity.canonical()).map(|m| {
            MemberAttributes {
                created: m.created,
                changed: m.changed,
                size: m.size(),
            }
        }))
    }

    async fn download(&self, identity: &MemberIdentity) -> FsResult<Option<String>> {
        self.plain_downloads.fetch_add(1, Ordering::Relaxed);
        Ok(self.members.get(&identity.canonical()).map(|m| m.text()))
    }

    async fn upload(&self, identity: &MemberIdentity, content: &str) -> FsResult<()> {
        self.plain_uploads.fetch_add(1, Ordering::Relaxed);
        let now = SystemTime::now();
        let records = records_from_text(content);
        self.members
            .entry(identity.canonical())
            .and_modify(|m| {
                m.records = records.clone();
                m.changed = now;
            })
            .or_insert(StoredMember {
                created: now,
                changed: now,
                records,
            });
        Ok(())
    }

    async fn download_with_dates(
        &self,
        identity: &MemberIdentity,
    ) -> FsResult<Option<Vec<SourceRecord>>> {
        self.dated_downloads.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .members
            .get(&identity.canonical())
            .map(|m| m.records.clone()))
    }

    async fn upload_with_dates(
        &self,
        identity: &MemberIdentity,
        records: &[SourceRecord],
    ) -> FsResult<()> {
        self.dated_uploads.fetch_add(1, Ordering::Relaxed);
        let now = SystemTime::now();
        self.members
            .entry(identity.canonical())
            .and_modify(|m| {
                m.records = records.to_vec();
                m.changed = now;
            })
            .or_insert(StoredMember {
                created: now,
                changed: now,
                records: records.to_vec(),
            });
        Ok(())
    }
}
