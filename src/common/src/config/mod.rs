//! Configuration for the backup pruner.
//!
//! Layered the usual way: serialized defaults, then an optional TOML file,
//! then `BACKUP_PRUNER__`-prefixed environment variables split on `__`.
//! Deciders are configured as a tagged tree that mirrors how they compose
//! at runtime.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "backup-pruner.toml";

/// Environment variable prefix, e.g. `BACKUP_PRUNER__STORAGE__DSN`.
pub const ENV_PREFIX: &str = "BACKUP_PRUNER__";

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub prune: PruneConfig,
}

/// Backup store location as a DSN.
///
/// Supported schemes: `memory://`, `file:///path`, and
/// `s3://[key:secret@]host[:port]/bucket` for S3 and S3-compatible stores.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    pub dsn: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dsn: String::from("file://.data/backups"),
        }
    }
}

/// Prune job configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PruneConfig {
    /// Dry-run mode: report the prune list without deleting anything.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Retention policy deciding which backups survive.
    #[serde(default = "default_decider")]
    pub decider: DeciderConfig,
}

fn default_dry_run() -> bool {
    true // Dry-run enabled by default for safety
}

fn default_decider() -> DeciderConfig {
    DeciderConfig::KeepAfterDuration {
        duration: Duration::from_secs(30 * 24 * 3600), // 30 days
    }
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            dry_run: default_dry_run(),
            decider: default_decider(),
        }
    }
}

/// Declarative retention policy tree.
///
/// The `type` tag selects the decider; combinator variants nest further
/// `deciders` in evaluation order. Unknown types fail deserialization,
/// before any storage I/O happens.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DeciderConfig {
    /// Keep backups taken strictly after a fixed instant (RFC 3339).
    KeepAfterTime { time: DateTime<Utc> },

    /// Keep backups younger than a window, e.g. `"30d"` or `"12h 30m"`.
    KeepAfterDuration {
        #[serde(with = "humantime_serde")]
        duration: Duration,
    },

    /// Keep every backup of the `keep` most recent versions.
    KeepNumberOfVersions { keep: usize },

    /// Keep the newest `count` backups of each version.
    KeepPerVersion { count: usize },

    /// Keep unless all nested deciders agree on dropping.
    AggregateAgree {
        #[serde(default)]
        deciders: Vec<DeciderConfig>,
    },

    /// First nested decider whose vote equals `match` decides.
    FirstKeepMatch {
        #[serde(rename = "match")]
        matches: bool,
        #[serde(default)]
        deciders: Vec<DeciderConfig>,
    },
}

impl Configuration {
    /// Load configuration from the default file and the environment.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(DEFAULT_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Load configuration from an explicit file path plus the environment.
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Validate the configuration before any storage I/O.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.storage.dsn.is_empty() {
            anyhow::bail!("Storage DSN cannot be empty");
        }
        Ok(())
    }
}
