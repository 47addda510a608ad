//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors represent violations of the hierarchy rules.
/// These are independent of how nodes are stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in hierarchy at node: {0}")]
    CycleDetected(NodeId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
