//! Hierarchy query service
//!
//! Answers structural questions about the node forest. Every query re-reads
//! the full node set from the store; nothing is cached between calls.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Node, NodeForest, NodeId};
use crate::infrastructure::traits::NodeStore;

/// Read-only query layer over the parent-pointer forest.
pub struct HierarchyManager {
    store: Arc<dyn NodeStore>,
    kind: String,
}

impl HierarchyManager {
    /// Create a hierarchy manager for nodes of `kind`.
    pub fn new(store: Arc<dyn NodeStore>, kind: impl Into<String>) -> Self {
        Self {
            store,
            kind: kind.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Full node set of the configured kind.
    ///
    /// The only call that touches the store; any failure is reported as
    /// `StoreUnavailable`.
    #[instrument(level = "debug", skip(self), fields(kind = %self.kind))]
    pub fn get_all_nodes(&self) -> ApplicationResult<Vec<Node>> {
        let nodes = self
            .store
            .list_nodes(&self.kind)
            .map_err(ApplicationError::unavailable)?;
        let nodes: Vec<Node> = nodes.into_iter().filter(|n| n.kind == self.kind).collect();
        debug!("get_all_nodes: {} nodes", nodes.len());
        Ok(nodes)
    }

    /// Arena view of the current listing.
    pub fn forest(&self) -> ApplicationResult<NodeForest> {
        Ok(NodeForest::from_nodes(self.get_all_nodes()?))
    }

    pub fn get_node(&self, id: &NodeId) -> ApplicationResult<Option<Node>> {
        Ok(self.get_all_nodes()?.into_iter().find(|n| &n.id == id))
    }

    /// Nodes without a parent in the listing, in store order.
    pub fn get_roots(&self) -> ApplicationResult<Vec<NodeId>> {
        Ok(self.forest()?.roots())
    }

    /// Direct children of `parent_id`, in store order.
    ///
    /// Read off the forest, so a duplicated record counts once.
    pub fn get_children(&self, parent_id: &NodeId) -> ApplicationResult<Vec<NodeId>> {
        debug!("get_children: parent={}", parent_id);
        Ok(self.forest()?.children(parent_id))
    }

    /// Every node below `node_id`, each once, parents before children.
    pub fn get_descendants(&self, node_id: &NodeId) -> ApplicationResult<Vec<NodeId>> {
        let descendants = self.forest()?.descendants(node_id);
        debug!(
            "get_descendants: node={}, found {}",
            node_id,
            descendants.len()
        );
        Ok(descendants)
    }

    /// Ancestors of `node_id`, nearest first.
    ///
    /// Corrupted data that loops back fails with `CycleDetected` instead of
    /// walking forever.
    pub fn get_parent_chain(&self, node_id: &NodeId) -> ApplicationResult<Vec<NodeId>> {
        debug!("get_parent_chain: node={}", node_id);
        Ok(self.forest()?.parent_chain(node_id)?)
    }

    /// Would making `proposed_parent_id` the parent of `node_id` close a loop?
    ///
    /// Callers must run this before persisting any parent change and reject
    /// the change on `true`.
    pub fn would_create_cycle(
        &self,
        node_id: &NodeId,
        proposed_parent_id: &NodeId,
    ) -> ApplicationResult<bool> {
        if node_id == proposed_parent_id {
            debug!("would_create_cycle: self-parent {}", node_id);
            return Ok(true);
        }
        let cycle = self.get_descendants(node_id)?.contains(proposed_parent_id);
        debug!(
            "would_create_cycle: node={}, proposed_parent={}, cycle={}",
            node_id, proposed_parent_id, cycle
        );
        Ok(cycle)
    }
}
