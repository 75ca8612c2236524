//! Prune-list construction and execution.
//!
//! The builder turns one listing of the backup store plus one decider into
//! the concrete set of keys to delete: list, parse, sort into scan order,
//! then poll the decider once per record in strict sequence. The executor
//! deletes a previously computed list, stopping at the first failure.

use futures::StreamExt;
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;
use thiserror::Error;

use crate::backup::{BackupRecord, ParseBackupError};
use crate::decider::Decider;

/// Errors from computing or executing a prune list.
#[derive(Debug, Error)]
pub enum PruneError {
    /// A recognizable backup key carried unparseable metadata.
    #[error(transparent)]
    Parse(#[from] ParseBackupError),

    /// The listing stream failed before reaching its end.
    #[error("listing backup objects: {0}")]
    List(#[source] object_store::Error),

    /// A deletion failed; earlier deletions in the batch stand.
    #[error("deleting backup '{key}': {source}")]
    Delete {
        key: String,
        source: object_store::Error,
    },
}

/// Compute the keys of every backup the decider rejects.
///
/// The decider is polled exactly once per record, newest first; stateful
/// deciders depend on both guarantees. Any listing error or hard parse
/// error aborts the computation with no partial result. An empty result
/// means nothing to prune.
pub async fn build_prune_list(
    store: &dyn ObjectStore,
    decider: &mut dyn Decider,
) -> Result<Vec<String>, PruneError> {
    let mut backups = Vec::new();
    let mut skipped = 0usize;

    let mut listing = store.list(None);
    while let Some(meta) = listing.next().await {
        let meta = meta.map_err(PruneError::List)?;
        match BackupRecord::parse(meta.location.as_ref())? {
            Some(backup) => backups.push(backup),
            None => skipped += 1,
        }
    }

    backups.sort();

    tracing::debug!(
        backups = backups.len(),
        skipped = skipped,
        "Scanned backup listing"
    );

    let mut prune_list = Vec::new();
    for backup in &backups {
        if !decider.keep(backup) {
            prune_list.push(backup.key.clone());
        }
    }

    tracing::info!(
        backups = backups.len(),
        pruned = prune_list.len(),
        "Computed prune list"
    );

    Ok(prune_list)
}

/// Delete every key in the prune list, in order.
///
/// Stops at the first failure and reports the failing key. Keys deleted
/// before the failure are not restored; the caller must treat the batch as
/// partially applied.
pub async fn delete_prune_list(
    store: &dyn ObjectStore,
    prune_list: &[String],
) -> Result<(), PruneError> {
    for key in prune_list {
        let path = ObjectPath::from(key.as_str());
        store
            .delete(&path)
            .await
            .map_err(|source| PruneError::Delete {
                key: key.clone(),
                source,
            })?;
        tracing::debug!(key = %key, "Deleted backup");
    }
    Ok(())
}
