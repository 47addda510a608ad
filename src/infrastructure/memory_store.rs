//! In-memory node store
//!
//! Keeps nodes in insertion order behind a mutex. Devices can be marked
//! offline and the whole store can be switched unavailable, which makes it
//! the store of choice for embedding and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{Node, NodeId};
use crate::infrastructure::traits::{NodeStore, StoreError};

#[derive(Debug, Clone)]
struct StoredNode {
    node: Node,
    online: bool,
}

#[derive(Debug)]
pub struct InMemoryNodeStore {
    nodes: Mutex<Vec<StoredNode>>,
    available: AtomicBool,
}

impl Default for InMemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNodeStore {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn with_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let store = Self::new();
        if let Ok(mut guard) = store.nodes.lock() {
            guard.extend(nodes.into_iter().map(|node| StoredNode { node, online: true }));
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredNode>>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        self.nodes
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    /// Add a node; an existing node with the same id is replaced.
    pub fn insert(&self, node: Node) -> Result<(), StoreError> {
        let mut nodes = self.lock()?;
        match nodes.iter_mut().find(|s| s.node.id == node.id) {
            Some(existing) => existing.node = node,
            None => nodes.push(StoredNode { node, online: true }),
        }
        Ok(())
    }

    /// Delete a node. Children keep their parent id; orphan them first.
    pub fn remove(&self, id: &NodeId) -> Result<Node, StoreError> {
        let mut nodes = self.lock()?;
        let pos = nodes
            .iter()
            .position(|s| &s.node.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(nodes.remove(pos).node)
    }

    pub fn get(&self, id: &NodeId) -> Option<Node> {
        self.nodes
            .lock()
            .ok()?
            .iter()
            .find(|s| &s.node.id == id)
            .map(|s| s.node.clone())
    }

    /// All nodes regardless of kind, in insertion order.
    pub fn snapshot(&self) -> Vec<Node> {
        self.nodes
            .lock()
            .map(|nodes| nodes.iter().map(|s| s.node.clone()).collect())
            .unwrap_or_default()
    }

    /// Mark a device reachable or not; writes to offline devices fail.
    pub fn set_online(&self, id: &NodeId, online: bool) -> bool {
        let Ok(mut nodes) = self.nodes.lock() else {
            return false;
        };
        match nodes.iter_mut().find(|s| &s.node.id == id) {
            Some(stored) => {
                stored.online = online;
                true
            }
            None => false,
        }
    }

    /// Switch the whole store reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl NodeStore for InMemoryNodeStore {
    fn list_nodes(&self, kind: &str) -> Result<Vec<Node>, StoreError> {
        let nodes = self.lock()?;
        Ok(nodes
            .iter()
            .filter(|s| s.node.kind == kind)
            .map(|s| s.node.clone())
            .collect())
    }

    fn set_node_state(&self, id: &NodeId, state: bool) -> Result<(), StoreError> {
        let mut nodes = self.lock()?;
        let stored = nodes
            .iter_mut()
            .find(|s| &s.node.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if !stored.online {
            return Err(StoreError::WriteFailed {
                id: id.clone(),
                reason: "device offline".to_string(),
            });
        }
        stored.node.state = state;
        Ok(())
    }

    fn set_node_parent(&self, id: &NodeId, parent: Option<&NodeId>) -> Result<(), StoreError> {
        let mut nodes = self.lock()?;
        let stored = nodes
            .iter_mut()
            .find(|s| &s.node.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        stored.node.parent_id = parent.cloned();
        Ok(())
    }
}
