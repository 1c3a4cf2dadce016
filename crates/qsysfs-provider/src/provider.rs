//! Member filesystem provider.
//!
//! Implements the editor-facing [`FileSystem`] contract over the remote
//! member namespace: cache-first stat, reconnect-once reads, and
//! invalidate-before-write. Directory listing, directory creation, and
//! deletion are owned by the object-browser components that talk to the
//! gateway directly; those operations fail loudly here. Likewise remote
//! rename execution stays with the browser command surface, so `rename`
//! only invalidates both cache entries.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use qsysfs_types::{FileAttr, FileKind, MemberIdentity, ResourceUri};

use crate::config::ConnectionSettings;
use crate::error::{FsError, FsResult};
use crate::notice::{Notice, NoticeHub};
use crate::session::{ConnectionHost, LifecycleEvent, SessionHandle};
use crate::source_dates::SourceDateOverlay;
use crate::stat_cache::{CacheLookup, StatCache};

/// Options for a write operation.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Create the target if it does not exist.
    pub create: bool,
    /// Overwrite existing content.
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            create: true,
            overwrite: true,
        }
    }
}

/// Options for a rename operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameOptions {
    /// Overwrite an existing target.
    pub overwrite: bool,
}

/// Kind of change reported on the change stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    /// Content or metadata changed.
    Changed,
    /// Resource appeared.
    Created,
    /// Resource disappeared.
    Deleted,
}

/// A change notification for a watched resource.
#[derive(Debug, Clone)]
pub struct FileChangeEvent {
    /// The resource that changed.
    pub uri: ResourceUri,
    /// What happened.
    pub kind: FileChangeKind,
}

/// Handle returned by `watch`. Dropping it ends the (no-op) watch.
///
/// The provider has no push channel from the host; change detection is
/// cache-invalidation-driven, so watches never fire.
#[derive(Debug)]
pub struct WatchHandle {
    uri: ResourceUri,
}

impl WatchHandle {
    /// The resource this handle watches.
    pub fn uri(&self) -> &ResourceUri {
        &self.uri
    }
}

/// Editor-facing filesystem operations.
///
/// The same contract the IFS stream-file provider implements; member and
/// stream-file resources differ only behind it.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Get attributes for a resource.
    async fn stat(&self, uri: &ResourceUri) -> FsResult<FileAttr>;

    /// Read full resource content.
    async fn read_file(&self, uri: &ResourceUri) -> FsResult<Vec<u8>>;

    /// Write full resource content.
    async fn write_file(&self, uri: &ResourceUri, data: &[u8], options: WriteOptions)
        -> FsResult<()>;

    /// Rename a resource.
    async fn rename(&self, from: &ResourceUri, to: &ResourceUri, options: RenameOptions)
        -> FsResult<()>;

    /// Watch a resource for changes.
    fn watch(&self, uri: &ResourceUri) -> WatchHandle;

    /// List a directory.
    async fn read_directory(&self, uri: &ResourceUri) -> FsResult<Vec<(String, FileKind)>>;

    /// Create a directory.
    async fn create_directory(&self, uri: &ResourceUri) -> FsResult<()>;

    /// Delete a resource.
    async fn delete(&self, uri: &ResourceUri) -> FsResult<()>;
}

/// The member filesystem provider.
pub struct MemberFsProvider {
    host: Arc<dyn ConnectionHost>,
    cache: StatCache,
    overlay: SourceDateOverlay,
    notices: Arc<NoticeHub>,
    settings: parking_lot::RwLock<ConnectionSettings>,
    changes: broadcast::Sender<FileChangeEvent>,
}

impl MemberFsProvider {
    /// Create a provider bound to a connection host.
    pub fn new(host: Arc<dyn ConnectionHost>) -> Self {
        let notices = Arc::new(NoticeHub::new());
        let (changes, _) = broadcast::channel(64);
        Self {
            host,
            cache: StatCache::new(),
            overlay: SourceDateOverlay::new(Arc::clone(&notices)),
            notices,
            settings: parking_lot::RwLock::new(ConnectionSettings::default()),
            changes,
        }
    }

    /// True while the source-date overlay is enabled.
    pub fn extended_member_support(&self) -> bool {
        self.overlay.enabled()
    }

    /// Settings currently in effect.
    pub fn settings(&self) -> ConnectionSettings {
        *self.settings.read()
    }

    /// Subscribe to user-visible notices.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Subscribe to the change-notification stream.
    ///
    /// Currently never emitted; see [`WatchHandle`].
    pub fn subscribe_changes(&self) -> broadcast::Receiver<FileChangeEvent> {
        self.changes.subscribe()
    }

    /// React to a connection lifecycle signal.
    pub fn handle_event(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Connected {
                capabilities,
                settings,
            } => {
                *self.settings.write() = *settings;
                self.overlay.recompute(settings, Some(capabilities));
                tracing::debug!(
                    extended = self.overlay.enabled(),
                    "connected; recomputed member support"
                );
            }
            LifecycleEvent::Disconnected => {
                let settings = *self.settings.read();
                self.overlay.recompute(&settings, None);
                self.cache.clear_all();
                tracing::debug!("disconnected; stat cache cleared");
            }
            LifecycleEvent::ConfigChanged { settings } => {
                *self.settings.write() = *settings;
                let capabilities = self.host.current().map(|s| s.capabilities);
                self.overlay.recompute(settings, capabilities.as_ref());
            }
        }
    }

    /// Drive the provider from a lifecycle broadcast channel.
    pub fn drive(
        self: Arc<Self>,
        mut events: broadcast::Receiver<LifecycleEvent>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle_event(&event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "lifecycle channel lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Invalidate cached attributes for one resource, or everything.
    ///
    /// Backs the user-facing clear command.
    pub fn clear_cached_attributes(&self, uri: Option<&ResourceUri>) {
        match uri {
            Some(uri) => self.cache.clear(&Self::cache_key(uri)),
            None => self.cache.clear_all(),
        }
    }

    /// Editor closed a document backed by this provider.
    pub fn document_closed(&self, uri: &ResourceUri) {
        self.cache.clear(&Self::cache_key(uri));
    }

    /// Cached entry count; negative markers included.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    fn cache_key(uri: &ResourceUri) -> String {
        uri.path.trim_start_matches('/').to_string()
    }

    /// Permission is computed at return time, never cached: global
    /// read-only mode OR the per-identifier readonly option.
    fn presented_readonly(&self, uri: &ResourceUri) -> bool {
        self.settings.read().readonly || uri.options().readonly
    }

    /// Session for a read: the live one, or exactly one reconnect attempt.
    async fn session_for_read(&self, uri: &ResourceUri) -> FsResult<SessionHandle> {
        if let Some(session) = self.host.current() {
            return Ok(session);
        }
        tracing::info!(uri = %uri, "no live session; attempting reconnect");
        self.host.reconnect().await.ok_or_else(|| {
            FsError::not_connected(format!("no connection for {uri} and reconnect failed"))
        })
    }
}

#[async_trait]
impl FileSystem for MemberFsProvider {
    #[tracing::instrument(skip(self, uri), name = "fs.stat", fields(uri = %uri))]
    async fn stat(&self, uri: &ResourceUri) -> FsResult<FileAttr> {
        let readonly = self.presented_readonly(uri);

        // Depth alone classifies: more than three raw segments is a member,
        // independent of remote existence.
        if uri.segment_count() <= 3 {
            return Ok(FileAttr::directory().with_readonly(readonly));
        }

        let key = Self::cache_key(uri);
        match self.cache.get(&key) {
            CacheLookup::Hit(attr) => return Ok(attr.with_readonly(readonly)),
            CacheLookup::ConfirmedAbsent => return Err(FsError::not_found(key)),
            CacheLookup::Miss => {}
        }

        let Some(session) = self.host.current() else {
            // Placeholder so the editor can still render the document tab.
            // Not cached: the next stat with a session queries for real.
            return Ok(FileAttr::placeholder(FileKind::File).with_readonly(readonly));
        };

        let identity = MemberIdentity::parse(&uri.path)?;
        match session.gateway.attributes(&identity).await? {
            Some(attrs) => {
                let attr = FileAttr::member(attrs.created, attrs.changed, attrs.size);
                self.cache.insert(key, attr.clone());
                Ok(attr.with_readonly(readonly))
            }
            None => {
                self.cache.insert_absent(key.clone());
                Err(FsError::not_found(key))
            }
        }
    }

    #[tracing::instrument(skip(self, uri), name = "fs.read", fields(uri = %uri))]
    async fn read_file(&self, uri: &ResourceUri) -> FsResult<Vec<u8>> {
        let identity = MemberIdentity::parse(&uri.path)?;
        let session = self.session_for_read(uri).await?;

        let content = if self.overlay.enabled() {
            self.overlay
                .download_with_dates(session.gateway.as_ref(), &identity)
                .await?
        } else {
            session.gateway.download(&identity).await?
        };

        match content {
            Some(text) => Ok(text.into_bytes()),
            None => Err(FsError::transfer_failed(format!("no content for {uri}"))),
        }
    }

    #[tracing::instrument(
        skip(self, uri, data, options),
        name = "fs.write",
        fields(uri = %uri, bytes = data.len(), create = options.create)
    )]
    async fn write_file(
        &self,
        uri: &ResourceUri,
        data: &[u8],
        options: WriteOptions,
    ) -> FsResult<()> {
        let identity = MemberIdentity::parse(&uri.path)?;

        // Invalidate before attempting the transfer so a failed upload
        // cannot leave stale positive cache data behind.
        self.cache.clear(&Self::cache_key(uri));

        let session = self
            .host
            .current()
            .ok_or_else(|| FsError::not_connected(format!("no connection for {uri}")))?;

        let text = String::from_utf8_lossy(data);
        if self.overlay.enabled() {
            self.overlay
                .upload_with_dates(session.gateway.as_ref(), &identity, &text)
                .await
        } else {
            session.gateway.upload(&identity, &text).await
        }
    }

    #[tracing::instrument(skip(self, from, to), name = "fs.rename", fields(from = %from, to = %to))]
    async fn rename(
        &self,
        from: &ResourceUri,
        to: &ResourceUri,
        _options: RenameOptions,
    ) -> FsResult<()> {
        // Remote rename execution belongs to the object browser; the
        // provider's part is keeping the cache honest for both names.
        self.cache.clear(&Self::cache_key(from));
        self.cache.clear(&Self::cache_key(to));
        Ok(())
    }

    fn watch(&self, uri: &ResourceUri) -> WatchHandle {
        WatchHandle { uri: uri.clone() }
    }

    async fn read_directory(&self, uri: &ResourceUri) -> FsResult<Vec<(String, FileKind)>> {
        Err(FsError::not_implemented(format!(
            "readDirectory on {uri}: listing is owned by the object browser"
        )))
    }

    async fn create_directory(&self, uri: &ResourceUri) -> FsResult<()> {
        Err(FsError::not_implemented(format!(
            "createDirectory on {uri}: creation is owned by the object browser"
        )))
    }

    async fn delete(&self, uri: &ResourceUri) -> FsResult<()> {
        self.cache.clear(&Self::cache_key(uri));
        Err(FsError::not_implemented(format!(
            "delete on {uri}: member deletion is owned by the object browser"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::session::SessionCapabilities;
    use qsysfs_types::FileOptions;
    use std::time::SystemTime;

    /// Host with a settable session and a scripted reconnect target.
    struct TestHost {
        session: parking_lot::RwLock<Option<SessionHandle>>,
        reconnect_to: parking_lot::RwLock<Option<SessionHandle>>,
    }

    impl TestHost {
        fn new() -> Self {
            Self {
                session: parking_lot::RwLock::new(None),
                reconnect_to: parking_lot::RwLock::new(None),
            }
        }

        fn connect(&self, handle: SessionHandle) {
            *self.session.write() = Some(handle);
        }

        fn disconnect(&self) {
            *self.session.write() = None;
        }
    }

    #[async_trait]
    impl ConnectionHost for TestHost {
        fn current(&self) -> Option<SessionHandle> {
            self.session.read().clone()
        }

        async fn reconnect(&self) -> Option<SessionHandle> {
            let restored = self.reconnect_to.read().clone();
            if let Some(handle) = &restored {
                *self.session.write() = Some(handle.clone());
            }
            restored
        }
    }

    fn member_uri(path: &str) -> ResourceUri {
        format!("member:{path}").parse().unwrap()
    }

    fn connected_provider() -> (Arc<MemberFsProvider>, Arc<MemoryGateway>, Arc<TestHost>) {
        let gateway = Arc::new(MemoryGateway::new());
        let host = Arc::new(TestHost::new());
        host.connect(SessionHandle::new(
            Arc::clone(&gateway) as Arc<dyn crate::gateway::ContentGateway>,
            SessionCapabilities::full(),
        ));
        let provider = Arc::new(MemberFsProvider::new(
            Arc::clone(&host) as Arc<dyn crate::session::ConnectionHost>,
        ));
        provider.handle_event(&LifecycleEvent::Connected {
            capabilities: SessionCapabilities::full(),
            settings: ConnectionSettings::default(),
        });
        (provider, gateway, host)
    }

    #[tokio::test]
    async fn test_depth_classifies_independent_of_existence() {
        let (provider, _gateway, _host) = connected_provider();

        let dir = provider.stat(&member_uri("/MYLIB/MYFILE")).await.unwrap();
        assert!(dir.is_dir());

        let lib = provider.stat(&member_uri("/MYLIB")).await.unwrap();
        assert!(lib.is_dir());
    }

    #[tokio::test]
    async fn test_stat_without_session_synthesizes_placeholder() {
        let host = Arc::new(TestHost::new());
        let provider =
            MemberFsProvider::new(Arc::clone(&host) as Arc<dyn crate::session::ConnectionHost>);

        let attr = provider
            .stat(&member_uri("/MYLIB/MYFILE/MEMBER1.RPGLE"))
            .await
            .unwrap();
        assert!(attr.is_file());
        assert_eq!(attr.size, 0);
        assert_eq!(attr.mtime, SystemTime::UNIX_EPOCH);
        // Not cached: nothing to go stale once a session appears.
        assert_eq!(provider.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_readonly_from_uri_option_and_global_mode() {
        let (provider, gateway, _host) = connected_provider();
        let identity = MemberIdentity::parse("MYLIB/MYFILE/MEMBER1.RPGLE").unwrap();
        gateway.put_member(&identity, "CONTENT");

        let plain = provider
            .stat(&member_uri("/MYLIB/MYFILE/MEMBER1.RPGLE"))
            .await
            .unwrap();
        assert!(!plain.readonly);

        let uri = ResourceUri::member(&identity, FileOptions::readonly());
        let forced = provider.stat(&uri).await.unwrap();
        assert!(forced.readonly);

        // Global read-only mode applies even on a cache hit.
        provider.handle_event(&LifecycleEvent::ConfigChanged {
            settings: ConnectionSettings {
                readonly: true,
                ..Default::default()
            },
        });
        let global = provider
            .stat(&member_uri("/MYLIB/MYFILE/MEMBER1.RPGLE"))
            .await
            .unwrap();
        assert!(global.readonly);
    }

    #[tokio::test]
    async fn test_write_requires_session_but_still_invalidates() {
        let (provider, gateway, host) = connected_provider();
        let identity = MemberIdentity::parse("MYLIB/MYFILE/MEMBER1.RPGLE").unwrap();
        gateway.put_member(&identity, "BEFORE");
        let uri = member_uri("/MYLIB/MYFILE/MEMBER1.RPGLE");

        provider.stat(&uri).await.unwrap();
        assert_eq!(provider.cached_entries(), 1);

        host.disconnect();
        let err = provider
            .write_file(&uri, b"AFTER", WriteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::NotConnected(_)));
        // Invalidation happened before the connectivity check.
        assert_eq!(provider.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_unimplemented_operations_fail_loudly() {
        let (provider, _gateway, _host) = connected_provider();
        let uri = member_uri("/MYLIB/MYFILE/MEMBER1.RPGLE");

        assert!(matches!(
            provider.read_directory(&member_uri("/MYLIB")).await,
            Err(FsError::NotImplemented(_))
        ));
        assert!(matches!(
            provider.create_directory(&member_uri("/MYLIB/NEWFILE")).await,
            Err(FsError::NotImplemented(_))
        ));
        assert!(matches!(
            provider.delete(&uri).await,
            Err(FsError::NotImplemented(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_invalidates_before_failing() {
        let (provider, gateway, _host) = connected_provider();
        let identity = MemberIdentity::parse("MYLIB/MYFILE/MEMBER1.RPGLE").unwrap();
        gateway.put_member(&identity, "CONTENT");
        let uri = member_uri("/MYLIB/MYFILE/MEMBER1.RPGLE");

        provider.stat(&uri).await.unwrap();
        assert_eq!(provider.cached_entries(), 1);

        let _ = provider.delete(&uri).await;
        assert_eq!(provider.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_watch_is_a_no_op_handle() {
        let (provider, _gateway, _host) = connected_provider();
        let uri = member_uri("/MYLIB/MYFILE/MEMBER1.RPGLE");
        let handle = provider.watch(&uri);
        assert_eq!(handle.uri(), &uri);
        drop(handle);
    }

    #[tokio::test]
    async fn test_drive_applies_lifecycle_events() {
        let (provider, _gateway, _host) = connected_provider();
        let (tx, rx) = broadcast::channel(8);
        let task = Arc::clone(&provider).drive(rx);

        tx.send(LifecycleEvent::Connected {
            capabilities: SessionCapabilities::full(),
            settings: ConnectionSettings {
                source_dates: true,
                ..Default::default()
            },
        })
        .unwrap();

        // Let the drive task observe the event.
        tokio::task::yield_now().await;
        for _ in 0..50 {
            if provider.extended_member_support() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        assert!(provider.extended_member_support());

        drop(tx);
        task.await.unwrap();
    }
}
