//! Topology service
//!
//! The write path for parent links: checked reparenting and orphaning of
//! children before a node is deleted.
//!
//! The cycle check and the commit are two separate store calls. A concurrent
//! reparent between them is not guarded against.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, NodeId};
use crate::infrastructure::traits::{NodeStore, StoreError};

use super::HierarchyManager;

pub struct TopologyService {
    hierarchy: Arc<HierarchyManager>,
    store: Arc<dyn NodeStore>,
}

impl TopologyService {
    pub fn new(hierarchy: Arc<HierarchyManager>) -> Self {
        let store = Arc::clone(hierarchy.store());
        Self { hierarchy, store }
    }

    /// Move `node_id` under `new_parent`, or make it a root with `None`.
    ///
    /// Rejects unknown nodes and parents, and any move that would close a
    /// loop, before anything is written.
    pub fn reparent(&self, node_id: &NodeId, new_parent: Option<&NodeId>) -> ApplicationResult<()> {
        debug!("reparent: node={}, new_parent={:?}", node_id, new_parent);
        let forest = self.hierarchy.forest()?;
        if !forest.contains(node_id) {
            return Err(DomainError::NodeNotFound(node_id.clone()).into());
        }

        if let Some(parent) = new_parent {
            if !forest.contains(parent) {
                return Err(DomainError::NodeNotFound(parent.clone()).into());
            }
            if self.hierarchy.would_create_cycle(node_id, parent)? {
                return Err(DomainError::CycleDetected(node_id.clone()).into());
            }
        }

        self.store
            .set_node_parent(node_id, new_parent)
            .map_err(ApplicationError::from_write)
    }

    /// Detach every direct child of `node_id`, making each a root.
    ///
    /// Returns the children that were detached. A child that disappears
    /// before its write is skipped.
    pub fn orphan_children(&self, node_id: &NodeId) -> ApplicationResult<Vec<NodeId>> {
        let children = self.hierarchy.get_children(node_id)?;
        let mut orphaned = Vec::with_capacity(children.len());

        for child in children {
            match self.store.set_node_parent(&child, None) {
                Ok(()) => orphaned.push(child),
                Err(StoreError::NotFound(id)) => {
                    warn!("orphan_children: child {} vanished, skipping", id);
                }
                Err(e) => return Err(ApplicationError::from_write(e)),
            }
        }

        debug!(
            "orphan_children: node={}, orphaned {}",
            node_id,
            orphaned.len()
        );
        Ok(orphaned)
    }
}
