//! I/O boundary traits for testability
//!
//! These traits abstract the node store and the filesystem behind it,
//! allowing services to be tested with mock implementations.

use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::domain::{Node, NodeId};

/// Failure reported by a node store.
///
/// Writes must tell a vanished node (`NotFound`) apart from an existing node
/// that refused the write (`WriteFailed`) and from the store itself being
/// unreachable (`Unavailable`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("node store unavailable: {0}")]
    Unavailable(String),

    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("write to node {id} failed: {reason}")]
    WriteFailed { id: NodeId, reason: String },
}

/// Node store abstraction consumed by the hierarchy services.
pub trait NodeStore: Send + Sync {
    /// Complete, current node set of the given kind. No pagination.
    fn list_nodes(&self, kind: &str) -> Result<Vec<Node>, StoreError>;

    /// Durably apply the on/off state of one node.
    fn set_node_state(&self, id: &NodeId, state: bool) -> Result<(), StoreError>;

    /// Reassign the parent of one node. Callers check for cycles first.
    fn set_node_parent(&self, id: &NodeId, parent: Option<&NodeId>) -> Result<(), StoreError>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file contents atomically (temp file in the same directory, then rename).
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        // temp files start out 0600; keep the mode of the file being replaced
        if let Ok(meta) = std::fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
