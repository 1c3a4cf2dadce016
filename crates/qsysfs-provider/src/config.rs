//! Connection settings relevant to the provider.
//!
//! Settings are owned by the connection manager and delivered to the
//! provider with lifecycle events; the provider never writes them back.

use serde::{Deserialize, Serialize};

/// How enabled source dates are surfaced to the editor.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceDateTracking {
    /// Dates follow edits line by line.
    #[default]
    Edit,
    /// Dates are recomputed from a diff against the downloaded snapshot.
    Diff,
}

/// Per-connection settings the provider reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Request the source-date overlay for member transfers.
    pub source_dates: bool,
    /// Tracking mode used when the overlay is enabled.
    pub source_date_tracking: SourceDateTracking,
    /// Global read-only mode: every presented file is read-only.
    pub readonly: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            source_dates: false,
            source_date_tracking: SourceDateTracking::Edit,
            readonly: false,
        }
    }
}

impl ConnectionSettings {
    /// Parse settings from a TOML document.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
