//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, NodeId};
use crate::infrastructure::traits::StoreError;

/// Application errors wrap domain errors and add store-level failures.
///
/// Only structural failures end up here. Per-node write failures during a
/// cascade are recorded in the `CascadeResult` instead.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("node store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("write rejected for node {id}: {reason}")]
    WriteRejected { id: NodeId, reason: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Any listing failure means the tree itself is unknowable.
    pub(crate) fn unavailable(err: StoreError) -> Self {
        let message = match err {
            StoreError::Unavailable(message) => message,
            other => other.to_string(),
        };
        Self::StoreUnavailable { message }
    }

    /// Map a failed write on a node the caller addressed directly.
    pub(crate) fn from_write(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => Self::StoreUnavailable { message },
            StoreError::NotFound(id) => Self::Domain(DomainError::NodeNotFound(id)),
            StoreError::WriteFailed { id, reason } => Self::WriteRejected { id, reason },
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Domain(DomainError::CycleDetected(_)))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
