//! Version-count retention.
//!
//! Both deciders in this module accumulate state across the scan and rely
//! on the newest-first ordering: "the N most recent versions" only means
//! something when records arrive newest first.

use semver::Version;
use std::collections::{HashMap, HashSet};

use super::Decider;
use crate::backup::BackupRecord;

/// Keeps every backup belonging to the first `keep` distinct versions
/// encountered during the scan.
///
/// Given the mandated newest-first order, those are the `keep` most recent
/// versions. A limit of zero keeps nothing.
#[derive(Debug, Clone, Default)]
pub struct KeepNumberOfVersions {
    keep: usize,
    seen: HashSet<Version>,
}

impl KeepNumberOfVersions {
    pub fn new(keep: usize) -> Self {
        Self {
            keep,
            seen: HashSet::new(),
        }
    }
}

impl Decider for KeepNumberOfVersions {
    fn keep(&mut self, backup: &BackupRecord) -> bool {
        if self.seen.len() >= self.keep {
            // The admitted set is full; only its members survive.
            return self.seen.contains(&backup.version);
        }
        self.seen.insert(backup.version.clone());
        true
    }
}

/// Keeps at most `limit` backups per distinct version.
///
/// Given the mandated newest-first order, the survivors are the newest
/// `limit` instances of each version. A limit of zero keeps nothing.
#[derive(Debug, Clone, Default)]
pub struct KeepPerVersion {
    limit: usize,
    counts: HashMap<Version, usize>,
}

impl KeepPerVersion {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            counts: HashMap::new(),
        }
    }
}

impl Decider for KeepPerVersion {
    fn keep(&mut self, backup: &BackupRecord) -> bool {
        let kept = self.counts.get(&backup.version).copied().unwrap_or(0);
        if kept >= self.limit {
            return false;
        }
        self.counts.insert(backup.version.clone(), kept + 1);
        true
    }
}
