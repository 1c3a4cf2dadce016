//! Source-date overlay.
//!
//! IBM i members historically carry a per-record date alongside each line
//! of text. When enabled, the overlay downloads members at the record
//! level and re-serializes them into a single text blob where every line
//! carries its date in a fixed, reversible encoding; uploads strip the
//! encoding back out and submit structured records.
//!
//! Wire encoding per line: six ASCII digits (YYMMDD, `000000` when the
//! record has no date) followed by the ASCII unit separator (U+001F), then
//! the record text. U+001F renders invisibly in editors and never occurs
//! in member source, so stripping is unambiguous.
//!
//! The overlay is a two-state machine: **Disabled** and **Enabled**.
//! Enabling requires the connection settings to request source dates AND
//! the session capabilities to report record-query support. A session
//! lacking the capability downgrades to Disabled with a single
//! user-visible notice per attempt; it never fails the caller.

use std::sync::Arc;

use parking_lot::RwLock;

use qsysfs_types::MemberIdentity;

use crate::config::{ConnectionSettings, SourceDateTracking};
use crate::error::FsResult;
use crate::gateway::{ContentGateway, SourceRecord};
use crate::notice::{Notice, NoticeHub};
use crate::session::SessionCapabilities;

/// Separator between the date prefix and the record text.
const DATE_SEPARATOR: char = '\u{1f}';

/// Width of the date prefix in characters.
const DATE_WIDTH: usize = 6;

/// Overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDateState {
    /// Plain content transfer.
    Disabled,
    /// Record-level transfer with the date encoding applied.
    Enabled {
        /// How dates are surfaced to the editor.
        tracking: SourceDateTracking,
    },
}

/// Serialize records into the editor-facing blob, one encoded line each.
pub fn annotate(records: &[SourceRecord]) -> String {
    let lines: Vec<String> = records
        .iter()
        .map(|r| format!("{:0>width$}{}{}", r.date, DATE_SEPARATOR, r.text, width = DATE_WIDTH))
        .collect();
    lines.join("\n")
}

/// Parse the encoded blob back into records.
///
/// Lines without a well-formed prefix (six digits + separator) are kept
/// whole with date 0, so stripping never loses text. Sequence numbers are
/// regenerated densely from 1; the host renumbers on structured writes.
pub fn strip(content: &str) -> Vec<SourceRecord> {
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let (date, text) = split_line(line);
            SourceRecord::new((i + 1) as u32, date, text)
        })
        .collect()
}

fn split_line(line: &str) -> (u32, &str) {
    let bytes = line.as_bytes();
    if bytes.len() > DATE_WIDTH
        && bytes[..DATE_WIDTH].iter().all(|b| b.is_ascii_digit())
        && line[DATE_WIDTH..].starts_with(DATE_SEPARATOR)
    {
        let date = line[..DATE_WIDTH].parse().unwrap_or(0);
        (date, &line[DATE_WIDTH + DATE_SEPARATOR.len_utf8()..])
    } else {
        (0, line)
    }
}

/// The overlay: state machine plus the download/upload transforms.
#[derive(Debug)]
pub struct SourceDateOverlay {
    state: RwLock<SourceDateState>,
    notices: Arc<NoticeHub>,
}

impl SourceDateOverlay {
    /// Create a disabled overlay publishing to the given notice hub.
    pub fn new(notices: Arc<NoticeHub>) -> Self {
        Self {
            state: RwLock::new(SourceDateState::Disabled),
            notices,
        }
    }

    /// Current state.
    pub fn state(&self) -> SourceDateState {
        *self.state.read()
    }

    /// Returns true when record-level transfer is active.
    pub fn enabled(&self) -> bool {
        matches!(self.state(), SourceDateState::Enabled { .. })
    }

    /// Recompute the state from settings and the live session capabilities.
    ///
    /// Called on every connect, disconnect (with `capabilities: None`), and
    /// relevant configuration change. A live session lacking record-query
    /// support raises [`Notice::SourceDatesUnavailable`] once per attempt.
    /// Recomputes without a session downgrade silently, since disconnection
    /// is not an enable attempt.
    pub fn recompute(
        &self,
        settings: &ConnectionSettings,
        capabilities: Option<&SessionCapabilities>,
    ) {
        let next = if !settings.source_dates {
            SourceDateState::Disabled
        } else {
            match capabilities {
                None => SourceDateState::Disabled,
                Some(caps) if !caps.record_queries => {
                    self.notices.publish(Notice::SourceDatesUnavailable);
                    SourceDateState::Disabled
                }
                Some(caps) => {
                    if caps.encoding_unreliable() {
                        self.notices.publish(Notice::UnreliableEncoding { ccsid: caps.ccsid });
                    }
                    SourceDateState::Enabled {
                        tracking: settings.source_date_tracking,
                    }
                }
            }
        };

        let mut state = self.state.write();
        if *state != next {
            tracing::debug!(?next, "source date overlay state change");
        }
        *state = next;
    }

    /// Download member content with the date encoding applied.
    ///
    /// Falls back to plain download when the record-level query produces
    /// nothing. Dates being unavailable is never an error; only a failed
    /// content transfer is.
    pub async fn download_with_dates(
        &self,
        gateway: &dyn ContentGateway,
        identity: &MemberIdentity,
    ) -> FsResult<Option<String>> {
        match gateway.download_with_dates(identity).await? {
            Some(records) => Ok(Some(annotate(&records))),
            None => {
                tracing::debug!(member = %identity, "no record-level rows; falling back to plain download");
                gateway.download(identity).await
            }
        }
    }

    /// Strip the date encoding and upload structured records.
    pub async fn upload_with_dates(
        &self,
        gateway: &dyn ContentGateway,
        identity: &MemberIdentity,
        content: &str,
    ) -> FsResult<()> {
        let records = strip(content);
        gateway.upload_with_dates(identity, &records).await
    }
}
