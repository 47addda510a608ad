//! Cascade service
//!
//! Propagates a state change from one node to all of its descendants.
//! Individual write failures are recorded and skipped; an unreachable store
//! aborts the whole operation.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, WriteResultExt};
use crate::domain::{CascadeResult, NodeId};
use crate::infrastructure::traits::NodeStore;

use super::HierarchyManager;

/// Drives state propagation through a subtree.
pub struct CascadeEngine {
    hierarchy: Arc<HierarchyManager>,
    store: Arc<dyn NodeStore>,
    pool: Option<rayon::ThreadPool>,
}

impl CascadeEngine {
    /// Create a cascade engine writing through the hierarchy's store.
    pub fn new(hierarchy: Arc<HierarchyManager>) -> Self {
        let store = Arc::clone(hierarchy.store());
        Self {
            hierarchy,
            store,
            pool: None,
        }
    }

    /// Run batch updates on a dedicated pool of `threads` workers.
    pub fn with_batch_threads(mut self, threads: usize) -> ApplicationResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("breakertree-batch-{}", i))
            .build()
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("build batch pool with {} threads", threads),
                source: Box::new(e),
            })?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Set every descendant of `node_id` to `new_state`, one write at a time.
    ///
    /// Writes follow traversal order (a parent is always attempted before its
    /// children) and each completes before the next starts. Nodes that vanished
    /// or refused the write are recorded in the result; an unreachable store
    /// stops the cascade and is returned as an error. Writes already applied
    /// stay applied.
    #[instrument(level = "debug", skip(self))]
    pub fn cascade(&self, node_id: &NodeId, new_state: bool) -> ApplicationResult<CascadeResult> {
        let descendants = self.hierarchy.get_descendants(node_id)?;
        self.write_in_order(node_id, descendants, new_state)
    }

    fn write_in_order(
        &self,
        node_id: &NodeId,
        descendants: Vec<NodeId>,
        new_state: bool,
    ) -> ApplicationResult<CascadeResult> {
        if descendants.is_empty() {
            debug!("cascade: {} has no descendants", node_id);
            return Ok(CascadeResult::default());
        }

        let result = descendants
            .into_iter()
            .try_fold(CascadeResult::default(), |mut acc, id| {
                let outcome = self.store.set_node_state(&id, new_state).into_outcome()?;
                acc.record(id, outcome);
                Ok::<_, ApplicationError>(acc)
            })?;

        info!(
            "cascade {} -> {}: {} succeeded, {} failed",
            node_id,
            if new_state { "on" } else { "off" },
            result.success_count,
            result.failure_count
        );
        Ok(result)
    }

    /// Set all `ids` to `new_state` concurrently, without ordering.
    ///
    /// Every write is issued regardless of the others. Failures are reported
    /// in input order. If any write finds the store unreachable the batch
    /// settles first and then fails with `StoreUnavailable`.
    #[instrument(level = "debug", skip(self, ids), fields(count = ids.len()))]
    pub fn update_many(&self, ids: &[NodeId], new_state: bool) -> ApplicationResult<CascadeResult> {
        if ids.is_empty() {
            return Ok(CascadeResult::default());
        }

        let store = &self.store;
        let write_all = || {
            ids.par_iter()
                .map(|id| (id.clone(), store.set_node_state(id, new_state).into_outcome()))
                .collect::<Vec<_>>()
        };
        let outcomes = match &self.pool {
            Some(pool) => pool.install(write_all),
            None => write_all(),
        };

        let result = outcomes
            .into_iter()
            .try_fold(CascadeResult::default(), |mut acc, (id, outcome)| {
                acc.record(id, outcome?);
                Ok::<_, ApplicationError>(acc)
            })?;

        info!(
            "update_many -> {}: {} succeeded, {} failed",
            if new_state { "on" } else { "off" },
            result.success_count,
            result.failure_count
        );
        Ok(result)
    }

    /// Flip `node_id` itself, then cascade the new state to its subtree.
    ///
    /// The subtree is listed before anything is written, so an unreachable
    /// store leaves every node untouched. A failed write on the node itself is
    /// a hard error and no cascade runs.
    #[instrument(level = "debug", skip(self))]
    pub fn switch(&self, node_id: &NodeId, new_state: bool) -> ApplicationResult<CascadeResult> {
        let descendants = self.hierarchy.get_descendants(node_id)?;
        self.store
            .set_node_state(node_id, new_state)
            .map_err(ApplicationError::from_write)?;
        self.write_in_order(node_id, descendants, new_state)
    }
}
