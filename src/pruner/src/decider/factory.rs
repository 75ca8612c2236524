//! Builds decider trees from configuration.
//!
//! Every call constructs a fresh tree. Count-based deciders are only
//! correct for a single scan, so callers get a new instance per prune run
//! instead of a cached one.

use anyhow::{Context, Result};

use super::{AggregateAgree, Decider, FirstKeepMatch, KeepAfterTime, KeepNumberOfVersions, KeepPerVersion};
use common::config::DeciderConfig;

/// Build a fresh decider tree from its configuration.
///
/// # Errors
///
/// Returns an error if a time-window decider cannot anchor its threshold.
/// Unknown decider types and malformed options never reach this function;
/// they fail when the configuration is deserialized.
pub fn build_decider(config: &DeciderConfig) -> Result<Box<dyn Decider>> {
    Ok(match config {
        DeciderConfig::KeepAfterTime { time } => Box::new(KeepAfterTime::new(*time)),
        DeciderConfig::KeepAfterDuration { duration } => Box::new(
            KeepAfterTime::after_duration(*duration)
                .context("building keep-after-duration decider")?,
        ),
        DeciderConfig::KeepNumberOfVersions { keep } => Box::new(KeepNumberOfVersions::new(*keep)),
        DeciderConfig::KeepPerVersion { count } => Box::new(KeepPerVersion::new(*count)),
        DeciderConfig::AggregateAgree { deciders } => {
            Box::new(AggregateAgree::new(build_children(deciders)?))
        }
        DeciderConfig::FirstKeepMatch { matches, deciders } => {
            Box::new(FirstKeepMatch::new(*matches, build_children(deciders)?))
        }
    })
}

fn build_children(configs: &[DeciderConfig]) -> Result<Vec<Box<dyn Decider>>> {
    configs
        .iter()
        .enumerate()
        .map(|(i, config)| {
            build_decider(config).with_context(|| format!("building nested decider {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupRecord;
    use chrono::DateTime;
    use std::time::Duration;

    fn backup(seconds: i64, version: &str) -> BackupRecord {
        BackupRecord {
            key: format!("{seconds}_2019_06_29_{version}_db_backup.tar"),
            timestamp: DateTime::from_timestamp(seconds, 0).unwrap(),
            version: semver::Version::parse(version).unwrap(),
        }
    }

    #[test]
    fn test_builds_each_variant() {
        let configs = [
            DeciderConfig::KeepAfterTime {
                time: DateTime::from_timestamp(1_561_766_400, 0).unwrap(),
            },
            DeciderConfig::KeepAfterDuration {
                duration: Duration::from_secs(30 * 24 * 3600),
            },
            DeciderConfig::KeepNumberOfVersions { keep: 3 },
            DeciderConfig::KeepPerVersion { count: 2 },
            DeciderConfig::AggregateAgree { deciders: vec![] },
            DeciderConfig::FirstKeepMatch {
                matches: false,
                deciders: vec![],
            },
        ];

        for config in &configs {
            build_decider(config).unwrap();
        }
    }

    #[test]
    fn test_builds_nested_combinators() {
        let config = DeciderConfig::FirstKeepMatch {
            matches: false,
            deciders: vec![
                DeciderConfig::KeepNumberOfVersions { keep: 2 },
                DeciderConfig::KeepPerVersion { count: 1 },
            ],
        };

        let mut decider = build_decider(&config).unwrap();

        assert!(decider.keep(&backup(400, "12.0.3")));
        assert!(!decider.keep(&backup(300, "12.0.3")));
    }

    #[test]
    fn test_each_call_returns_fresh_state() {
        let config = DeciderConfig::KeepNumberOfVersions { keep: 1 };

        let mut first = build_decider(&config).unwrap();
        assert!(first.keep(&backup(400, "12.0.3")));
        assert!(!first.keep(&backup(300, "11.7.0")));

        // A second tree has not seen any versions yet.
        let mut second = build_decider(&config).unwrap();
        assert!(second.keep(&backup(300, "11.7.0")));
    }

    #[test]
    fn test_unrepresentable_duration_fails_construction() {
        let config = DeciderConfig::KeepAfterDuration {
            duration: Duration::from_secs(u64::MAX),
        };

        assert!(build_decider(&config).is_err());
    }
}
