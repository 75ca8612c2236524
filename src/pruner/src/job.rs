//! One-shot prune run orchestration.

use object_store::ObjectStore;
use std::sync::Arc;

use crate::decider::Decider;
use crate::prune::{PruneError, build_prune_list, delete_prune_list};

/// Outcome of one prune run.
#[derive(Debug, Clone)]
pub struct PruneRunReport {
    /// Keys selected for deletion, in scan order. Treat as a set.
    pub pruned: Vec<String>,
    /// Number of backups actually deleted (always zero in dry-run).
    pub deleted: usize,
    /// Whether this run was a dry run.
    pub dry_run: bool,
}

/// Runs the prune pipeline once against one backup store.
///
/// In dry-run mode the computed prune list is logged and reported but the
/// executor is never invoked.
pub struct PruneJob {
    object_store: Arc<dyn ObjectStore>,
    dry_run: bool,
}

impl PruneJob {
    pub fn new(object_store: Arc<dyn ObjectStore>, dry_run: bool) -> Self {
        Self {
            object_store,
            dry_run,
        }
    }

    /// Compute the prune list and, unless dry-run, delete it.
    ///
    /// The decider must be fresh; a reused instance carries scan state from
    /// its previous run and corrupts the result.
    pub async fn run(&self, decider: &mut dyn Decider) -> Result<PruneRunReport, PruneError> {
        tracing::info!(dry_run = self.dry_run, "Starting prune run");

        let pruned = build_prune_list(self.object_store.as_ref(), decider).await?;

        if self.dry_run {
            for key in &pruned {
                tracing::info!(key = %key, "[DRY-RUN] Would delete backup");
            }
            tracing::info!(
                pruned = pruned.len(),
                "Dry run complete, no backups deleted"
            );
            return Ok(PruneRunReport {
                pruned,
                deleted: 0,
                dry_run: true,
            });
        }

        delete_prune_list(self.object_store.as_ref(), &pruned).await?;

        tracing::info!(deleted = pruned.len(), "Prune run complete");
        Ok(PruneRunReport {
            deleted: pruned.len(),
            pruned,
            dry_run: false,
        })
    }
}
