//! Time-based retention.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

use super::Decider;
use crate::backup::BackupRecord;

/// Keeps every backup taken strictly after a fixed threshold.
///
/// Stateless; the threshold never moves during a scan.
#[derive(Debug, Clone)]
pub struct KeepAfterTime {
    threshold: DateTime<Utc>,
}

impl KeepAfterTime {
    pub fn new(threshold: DateTime<Utc>) -> Self {
        Self { threshold }
    }

    /// Keep backups younger than `window`, anchored at construction time.
    ///
    /// The threshold is `now - window`, computed once here rather than per
    /// record, so a long scan cannot move the cutoff under the records it
    /// is classifying.
    ///
    /// # Errors
    ///
    /// Returns an error if `now - window` is not representable.
    pub fn after_duration(window: Duration) -> Result<Self> {
        let window_chrono = chrono::Duration::from_std(window).map_err(|e| {
            anyhow::anyhow!(
                "retention window {} is too large: {e}",
                humantime::format_duration(window)
            )
        })?;
        let threshold = Utc::now().checked_sub_signed(window_chrono).ok_or_else(|| {
            anyhow::anyhow!(
                "retention window {} reaches past the representable time range",
                humantime::format_duration(window)
            )
        })?;
        Ok(Self::new(threshold))
    }

    pub fn threshold(&self) -> DateTime<Utc> {
        self.threshold
    }
}

impl Decider for KeepAfterTime {
    fn keep(&mut self, backup: &BackupRecord) -> bool {
        backup.timestamp > self.threshold
    }
}
