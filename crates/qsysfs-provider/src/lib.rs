//! # qsysfs-provider
//!
//! The member filesystem bridge: maps hierarchical editor filesystem
//! operations (stat, read, write, rename, watch) onto a remote,
//! latency-bound, session-oriented IBM i host. Key components:
//!
//! - [`MemberFsProvider`] - Orchestrator implementing the editor-facing
//!   [`FileSystem`] contract
//! - [`StatCache`] - Path-keyed attribute cache with explicit negative
//!   entries, invalidated by editor lifecycle events only
//! - [`SourceDateOverlay`] - Optional transform carrying per-record source
//!   dates through download/upload
//! - [`ContentGateway`] - Contract for the remote content/attribute calls;
//!   [`MemoryGateway`] implements it in-process for tests and offline use
//! - [`ConnectionHost`] - Handle to the externally-owned session
//!
//! ## Design Decisions
//!
//! - **Cache-first stat**: one attribute query per path between
//!   invalidations, including confirmed-absent results.
//! - **Invalidate before write**: a failed upload never leaves stale
//!   positive cache data behind.
//! - **Capability downgrades never fail callers**: a session without
//!   record-query support silently falls back to plain transfer, raising a
//!   user-visible [`Notice`] instead of an error.

pub mod config;
pub mod error;
pub mod gateway;
pub mod notice;
pub mod provider;
pub mod session;
pub mod source_dates;
pub mod stat_cache;

pub use config::{ConnectionSettings, SourceDateTracking};
pub use error::{FsError, FsResult};
pub use gateway::{ContentGateway, MemberAttributes, MemoryGateway, SourceRecord};
pub use notice::{Notice, NoticeHub};
pub use provider::{
    FileChangeEvent, FileChangeKind, FileSystem, MemberFsProvider, RenameOptions, WatchHandle,
    WriteOptions,
};
pub use session::{ConnectionHost, LifecycleEvent, SessionCapabilities, SessionHandle, CCSID_UNRELIABLE};
pub use source_dates::{SourceDateOverlay, SourceDateState};
pub use stat_cache::{CacheLookup, StatCache};
