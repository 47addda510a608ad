//! Domain entities: core data structures

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Node kind handled when no other kind is configured.
pub const DEFAULT_KIND: &str = "breaker";

/// Opaque, stable identifier of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A controllable on/off node ("breaker") linked to its parent by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Node kind; stores list nodes filtered by it
    pub kind: String,
    /// `None` marks a root
    pub parent_id: Option<NodeId>,
    /// On/off state, the value being cascaded
    pub state: bool,
}

impl Node {
    /// Create a root node of the default kind, switched on.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: DEFAULT_KIND.to_string(),
            parent_id: None,
            state: true,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.id, if self.state { "on" } else { "off" })
    }
}

/// Outcome of a single soft write during a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The node vanished between listing and writing
    NotFound(String),
    /// The node exists but refused or could not take the write
    Failed(String),
}

/// One descendant that could not be updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeFailure {
    pub node_id: NodeId,
    pub reason: String,
    pub not_found: bool,
}

impl fmt::Display for CascadeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not_found {
            write!(f, "{}: {} (not found)", self.node_id, self.reason)
        } else {
            write!(f, "{}: {}", self.node_id, self.reason)
        }
    }
}

/// Coarse classification of a cascade for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// Nothing to update
    NoOp,
    Complete,
    /// Some writes failed, others were applied
    Partial,
    /// Every write failed
    Failed,
}

impl fmt::Display for CascadeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CascadeOutcome::NoOp => "no-op",
            CascadeOutcome::Complete => "complete",
            CascadeOutcome::Partial => "partial",
            CascadeOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Accumulated result of propagating a state change.
///
/// `success_count + failure_count` always equals the number of nodes processed;
/// `failures` keeps the order in which the writes were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<CascadeFailure>,
}

impl CascadeResult {
    /// Fold one write outcome into the summary.
    pub fn record(&mut self, node_id: NodeId, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Applied => self.success_count += 1,
            WriteOutcome::NotFound(reason) => self.push_failure(node_id, reason, true),
            WriteOutcome::Failed(reason) => self.push_failure(node_id, reason, false),
        }
    }

    fn push_failure(&mut self, node_id: NodeId, reason: String, not_found: bool) {
        self.failure_count += 1;
        self.failures.push(CascadeFailure {
            node_id,
            reason,
            not_found,
        });
    }

    pub fn processed(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn is_noop(&self) -> bool {
        self.processed() == 0
    }

    /// Share of failed writes, `0.0` for an empty result.
    pub fn failure_ratio(&self) -> f64 {
        if self.is_noop() {
            0.0
        } else {
            self.failure_count as f64 / self.processed() as f64
        }
    }

    pub fn outcome(&self) -> CascadeOutcome {
        match (self.success_count, self.failure_count) {
            (0, 0) => CascadeOutcome::NoOp,
            (_, 0) => CascadeOutcome::Complete,
            (0, _) => CascadeOutcome::Failed,
            _ => CascadeOutcome::Partial,
        }
    }
}
