//! Session handle and connection lifecycle types.
//!
//! The live session is a process-wide resource owned by the connection
//! manager; the provider only reads its presence and capabilities through
//! [`ConnectionHost`] and asks for at most one reconnect per read. The
//! capability set is an explicit descriptor fixed at connect time; the
//! provider never probes the session object at run time.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ConnectionSettings;
use crate::gateway::ContentGateway;

/// CCSID sentinel for an unreliable or mixed character encoding.
pub const CCSID_UNRELIABLE: u16 = 65535;

/// Capability descriptor reported by the session at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapabilities {
    /// The session can run the auxiliary record-level query mechanism the
    /// source-date overlay needs.
    pub record_queries: bool,
    /// Character encoding of the job servicing this session.
    pub ccsid: u16,
}

impl SessionCapabilities {
    /// Capabilities of a fully featured session.
    pub fn full() -> Self {
        Self {
            record_queries: true,
            ccsid: 37,
        }
    }

    /// Capabilities of a session without record-level queries.
    pub fn basic() -> Self {
        Self {
            record_queries: false,
            ccsid: 37,
        }
    }

    /// Returns true if the reported encoding is the unreliable sentinel.
    pub fn encoding_unreliable(&self) -> bool {
        self.ccsid == CCSID_UNRELIABLE
    }
}

/// A live session: the gateway plus its connect-time capabilities.
#[derive(Clone)]
pub struct SessionHandle {
    /// Remote content gateway for this session.
    pub gateway: Arc<dyn ContentGateway>,
    /// Capabilities fixed at connect time.
    pub capabilities: SessionCapabilities,
}

impl SessionHandle {
    /// Build a handle around a gateway.
    pub fn new(gateway: Arc<dyn ContentGateway>, capabilities: SessionCapabilities) -> Self {
        Self {
            gateway,
            capabilities,
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Handle to the externally-owned connection.
///
/// `current` reflects whatever session the connection manager holds right
/// now. `reconnect` asks it to re-establish the previously used target;
/// `None` means that attempt failed; the provider never retries further.
#[async_trait]
pub trait ConnectionHost: Send + Sync {
    /// The live session, if one exists.
    fn current(&self) -> Option<SessionHandle>;

    /// Attempt one reconnection to the previously used target.
    async fn reconnect(&self) -> Option<SessionHandle>;
}

/// Connection lifecycle signals the provider reacts to.
///
/// Delivered by direct call ([`MemberFsProvider::handle_event`]) or over a
/// broadcast channel the provider is driven from.
///
/// [`MemberFsProvider::handle_event`]: crate::provider::MemberFsProvider::handle_event
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// A session was established.
    Connected {
        /// Connect-time capability descriptor.
        capabilities: SessionCapabilities,
        /// Settings active for this connection.
        settings: ConnectionSettings,
    },
    /// The session dropped.
    Disconnected,
    /// Connection or source-date display settings changed.
    ConfigChanged {
        /// The updated settings.
        settings: ConnectionSettings,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_presets() {
        assert!(SessionCapabilities::full().record_queries);
        assert!(!SessionCapabilities::basic().record_queries);
        assert!(!SessionCapabilities::full().encoding_unreliable());
    }

    #[test]
    fn test_unreliable_encoding_sentinel() {
        let caps = SessionCapabilities {
            record_queries: true,
            ccsid: CCSID_UNRELIABLE,
        };
        assert!(caps.encoding_unreliable());
    }
}
