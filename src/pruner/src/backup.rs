//! Backup metadata parsed out of object keys.
//!
//! A backup archive is stored under a key of exactly seven
//! underscore-separated segments:
//!
//! ```text
//! <unixSeconds>_<opaque>_<opaque>_<opaque>_<semver>_<opaque>_<opaque>
//! ```
//!
//! Only segments 0 (creation time) and 4 (producing software version) are
//! interpreted; the full key stays opaque and is what gets deleted. Keys
//! with a different segment count are not backups and are skipped, while a
//! recognizable key with unparseable metadata aborts the whole computation.

use chrono::{DateTime, Utc};
use semver::Version;
use std::cmp::Ordering;
use thiserror::Error;

/// Number of underscore-separated segments in a backup key.
const KEY_SEGMENTS: usize = 7;

/// Index of the Unix-seconds segment.
const TIMESTAMP_SEGMENT: usize = 0;

/// Index of the semantic-version segment.
const VERSION_SEGMENT: usize = 4;

/// Metadata for one stored backup archive.
///
/// Created transiently per prune computation from one listed object and
/// discarded afterwards; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Object key, used verbatim for deletion.
    pub key: String,
    /// Point in time the backup was taken (key segment 0).
    pub timestamp: DateTime<Utc>,
    /// Version of the software that produced the backup (key segment 4).
    pub version: Version,
}

impl BackupRecord {
    /// Parse a listed object key into a backup record.
    ///
    /// Returns `Ok(None)` for keys that do not split into exactly seven
    /// segments; those are unrelated objects, not errors. A key with the
    /// right shape but an unparseable timestamp or version is a hard error:
    /// it looks like a backup and is not, which signals corruption worth
    /// stopping for.
    pub fn parse(key: &str) -> Result<Option<Self>, ParseBackupError> {
        let segments: Vec<&str> = key.split('_').collect();
        if segments.len() != KEY_SEGMENTS {
            return Ok(None);
        }

        let seconds: i64 = segments[TIMESTAMP_SEGMENT].parse().map_err(|source| {
            ParseBackupError::Timestamp {
                key: key.to_string(),
                source,
            }
        })?;
        let timestamp = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            ParseBackupError::TimestampRange {
                key: key.to_string(),
                seconds,
            }
        })?;

        let version = Version::parse(segments[VERSION_SEGMENT]).map_err(|source| {
            ParseBackupError::Version {
                key: key.to_string(),
                value: segments[VERSION_SEGMENT].to_string(),
                source,
            }
        })?;

        Ok(Some(Self {
            key: key.to_string(),
            timestamp,
            version,
        }))
    }
}

/// Scan order: newest first, then higher version first.
///
/// Every stateful decider assumes this order; sorting a listing with it
/// makes "the N most recent versions" well defined. Keys break full ties so
/// runs are reproducible across listings.
impl Ord for BackupRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.version.cmp(&self.version))
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl PartialOrd for BackupRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Errors from parsing a recognizable backup key.
#[derive(Debug, Error)]
pub enum ParseBackupError {
    /// Segment 0 is not a base-10 integer.
    #[error("invalid backup timestamp in key '{key}': {source}")]
    Timestamp {
        key: String,
        source: std::num::ParseIntError,
    },

    /// Segment 0 parsed but is outside the representable time range.
    #[error("backup timestamp {seconds} in key '{key}' is out of range")]
    TimestampRange { key: String, seconds: i64 },

    /// Segment 4 is not a semantic version.
    #[error("invalid backup version '{value}' in key '{key}': {source}")]
    Version {
        key: String,
        value: String,
        source: semver::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backup_key() {
        let record = BackupRecord::parse("1540174211_2018_10_22_11.3.6_db_backup.tar")
            .unwrap()
            .unwrap();

        assert_eq!(record.key, "1540174211_2018_10_22_11.3.6_db_backup.tar");
        assert_eq!(record.timestamp, DateTime::from_timestamp(1540174211, 0).unwrap());
        assert_eq!(record.version, Version::new(11, 3, 6));
    }

    #[test]
    fn test_parse_key_with_prerelease_and_build_metadata() {
        let record = BackupRecord::parse("1565056820_2019_08_06_12.0.3-rc.1+build.5_db_backup.tar")
            .unwrap()
            .unwrap();

        assert_eq!(record.version, Version::parse("12.0.3-rc.1+build.5").unwrap());
    }

    #[test]
    fn test_non_backup_keys_are_skipped() {
        // Wrong segment count means "not a backup", never an error.
        assert!(BackupRecord::parse("manifest.json").unwrap().is_none());
        assert!(BackupRecord::parse("1540174211_11.3.6_backup.tar").unwrap().is_none());
        assert!(
            BackupRecord::parse("1540174211_a_b_c_11.3.6_d_e_extra")
                .unwrap()
                .is_none()
        );
        assert!(BackupRecord::parse("").unwrap().is_none());
    }

    #[test]
    fn test_unparseable_timestamp_is_fatal() {
        let err = BackupRecord::parse("notatime_2018_10_22_11.3.6_db_backup.tar").unwrap_err();
        assert!(matches!(err, ParseBackupError::Timestamp { .. }));
        assert!(err.to_string().contains("notatime_2018_10_22"));
    }

    #[test]
    fn test_out_of_range_timestamp_is_fatal() {
        let key = format!("{}_2018_10_22_11.3.6_db_backup.tar", i64::MAX);
        let err = BackupRecord::parse(&key).unwrap_err();
        assert!(matches!(err, ParseBackupError::TimestampRange { .. }));
    }

    #[test]
    fn test_unparseable_version_is_fatal() {
        let err = BackupRecord::parse("1540174211_2018_10_22_eleven_db_backup.tar").unwrap_err();
        assert!(matches!(err, ParseBackupError::Version { .. }));
        assert!(err.to_string().contains("eleven"));
    }

    #[test]
    fn test_scan_order_newest_first() {
        let mut records = vec![
            BackupRecord::parse("1540174211_2018_10_22_11.3.6_db_backup.tar")
                .unwrap()
                .unwrap(),
            BackupRecord::parse("1565056820_2019_08_06_12.0.3_db_backup.tar")
                .unwrap()
                .unwrap(),
            BackupRecord::parse("1543197673_2018_11_26_11.4.0_db_backup.tar")
                .unwrap()
                .unwrap(),
        ];

        records.sort();

        let timestamps: Vec<i64> = records.iter().map(|r| r.timestamp.timestamp()).collect();
        assert_eq!(timestamps, vec![1565056820, 1543197673, 1540174211]);
    }

    #[test]
    fn test_scan_order_breaks_timestamp_ties_by_version() {
        let mut records = vec![
            BackupRecord::parse("1540174211_2018_10_22_11.3.6_db_backup.tar")
                .unwrap()
                .unwrap(),
            BackupRecord::parse("1540174211_2018_10_22_11.4.0_db_backup.tar")
                .unwrap()
                .unwrap(),
        ];

        records.sort();

        assert_eq!(records[0].version, Version::new(11, 4, 0));
        assert_eq!(records[1].version, Version::new(11, 3, 6));
    }

    #[test]
    fn test_prerelease_orders_below_release() {
        let mut records = vec![
            BackupRecord::parse("1540174211_2018_10_22_11.4.0-rc.1_db_backup.tar")
                .unwrap()
                .unwrap(),
            BackupRecord::parse("1540174211_2018_10_22_11.4.0_db_backup.tar")
                .unwrap()
                .unwrap(),
        ];

        records.sort();

        assert!(records[0].version.pre.is_empty());
        assert!(!records[1].version.pre.is_empty());
    }
}
