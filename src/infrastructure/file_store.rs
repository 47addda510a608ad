//! TOML-file backed node store
//!
//! The file is re-read on every call. Mutations take a process-local lock,
//! rewrite the whole file and replace it atomically.
//!
//! ```toml
//! [[node]]
//! id = "main"
//! state = true
//!
//! [[node]]
//! id = "kitchen"
//! parent = "main"
//! state = true
//! online = false
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Node, NodeId, DEFAULT_KIND};
use crate::infrastructure::traits::{FileSystem, NodeStore, RealFileSystem, StoreError};

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

fn default_online() -> bool {
    true
}

/// One `[[node]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub state: bool,
    /// Simulated device reachability; writes to offline nodes fail
    #[serde(default = "default_online")]
    pub online: bool,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Node {
            id: record.id,
            kind: record.kind,
            parent_id: record.parent,
            state: record.state,
        }
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        NodeRecord {
            id: node.id,
            kind: node.kind,
            parent: node.parent_id,
            state: node.state,
            online: true,
        }
    }
}

/// On-disk document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFile {
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeRecord>,
}

pub struct FileNodeStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    write_lock: Mutex<()>,
}

impl FileNodeStore {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            write_lock: Mutex::new(()),
        }
    }

    /// Store on the real filesystem.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Arc::new(RealFileSystem))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty store file if none exists yet.
    pub fn init(&self) -> Result<bool, StoreError> {
        if self.fs.exists(&self.path) {
            return Ok(false);
        }
        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| self.unavailable("create directory", e))?;
        self.save(&NodeFile::default())?;
        Ok(true)
    }

    pub fn load(&self) -> Result<NodeFile, StoreError> {
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| self.unavailable("read", e))?;
        toml::from_str(&content).map_err(|e| self.unavailable("parse", e))
    }

    fn save(&self, file: &NodeFile) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(file).map_err(|e| self.unavailable("serialize", e))?;
        self.fs
            .write_atomic(&self.path, &content)
            .map_err(|e| self.unavailable("write", e))
    }

    fn unavailable(&self, action: &str, err: impl std::fmt::Display) -> StoreError {
        StoreError::Unavailable(format!("{} {}: {}", action, self.path.display(), err))
    }

    /// Load, modify and save under the write lock.
    fn update<T>(
        &self,
        apply: impl FnOnce(&mut NodeFile) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        let mut file = self.load()?;
        let value = apply(&mut file)?;
        self.save(&file)?;
        Ok(value)
    }

    fn record_mut<'a>(file: &'a mut NodeFile, id: &NodeId) -> Result<&'a mut NodeRecord, StoreError> {
        file.nodes
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Append a node. Ids must be unique.
    pub fn insert(&self, node: Node) -> Result<(), StoreError> {
        debug!("insert: id={}", node.id);
        self.update(|file| {
            if file.nodes.iter().any(|r| r.id == node.id) {
                return Err(StoreError::WriteFailed {
                    id: node.id.clone(),
                    reason: "id already exists".to_string(),
                });
            }
            file.nodes.push(NodeRecord::from(node));
            Ok(())
        })
    }

    /// Delete a node. Children keep their parent id; orphan them first.
    pub fn remove(&self, id: &NodeId) -> Result<Node, StoreError> {
        debug!("remove: id={}", id);
        self.update(|file| {
            let pos = file
                .nodes
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            Ok(Node::from(file.nodes.remove(pos)))
        })
    }
}

impl NodeStore for FileNodeStore {
    fn list_nodes(&self, kind: &str) -> Result<Vec<Node>, StoreError> {
        let file = self.load()?;
        Ok(file
            .nodes
            .into_iter()
            .filter(|r| r.kind == kind)
            .map(Node::from)
            .collect())
    }

    fn set_node_state(&self, id: &NodeId, state: bool) -> Result<(), StoreError> {
        self.update(|file| {
            let record = Self::record_mut(file, id)?;
            if !record.online {
                return Err(StoreError::WriteFailed {
                    id: id.clone(),
                    reason: "device offline".to_string(),
                });
            }
            record.state = state;
            Ok(())
        })
    }

    fn set_node_parent(&self, id: &NodeId, parent: Option<&NodeId>) -> Result<(), StoreError> {
        self.update(|file| {
            Self::record_mut(file, id)?.parent = parent.cloned();
            Ok(())
        })
    }
}
