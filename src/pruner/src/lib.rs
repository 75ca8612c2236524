//! Backup retention engine.
//!
//! Decides which blob-stored backup archives are obsolete under a
//! composable retention policy and removes exactly those. The engine only
//! requires listing and deletion from its [`object_store::ObjectStore`]
//! collaborator; everything else (policy configuration, storage
//! credentials, CLI) lives outside this crate.
//!
//! - `backup`: parsed backup metadata and the canonical scan order
//! - `decider`: the retention predicate library and its combinators
//! - `prune`: prune-list builder and executor
//! - `job`: one-shot run orchestration with dry-run support

pub mod backup;
pub mod decider;
pub mod job;
pub mod prune;

// Re-export commonly used types
pub use backup::{BackupRecord, ParseBackupError};
pub use decider::{
    AggregateAgree, Decider, FirstKeepMatch, KeepAfterTime, KeepNumberOfVersions, KeepPerVersion,
    build_decider,
};
pub use job::{PruneJob, PruneRunReport};
pub use prune::{PruneError, build_prune_list, delete_prune_list};
