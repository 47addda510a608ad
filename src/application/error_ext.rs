//! Error conversion helpers for store results
//!
//! Provides an extension trait that classifies a node write into the
//! soft/hard split a cascade needs.

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::WriteOutcome;
use crate::infrastructure::traits::StoreError;

/// Extension trait for turning a store write into a cascade outcome.
pub trait WriteResultExt {
    /// Classify a write for accumulation.
    ///
    /// A missing node or a refused write becomes a soft `WriteOutcome`; an
    /// unreachable store stays a hard error.
    ///
    /// # Example
    /// ```ignore
    /// let outcome = store.set_node_state(&id, true).into_outcome()?;
    /// result.record(id, outcome);
    /// ```
    fn into_outcome(self) -> ApplicationResult<WriteOutcome>;
}

impl WriteResultExt for Result<(), StoreError> {
    fn into_outcome(self) -> ApplicationResult<WriteOutcome> {
        match self {
            Ok(()) => Ok(WriteOutcome::Applied),
            Err(StoreError::NotFound(id)) => Ok(WriteOutcome::NotFound(format!(
                "node {} no longer exists",
                id
            ))),
            Err(StoreError::WriteFailed { reason, .. }) => Ok(WriteOutcome::Failed(reason)),
            Err(StoreError::Unavailable(message)) => {
                Err(ApplicationError::StoreUnavailable { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(result: Result<(), StoreError>) -> ApplicationResult<WriteOutcome> {
        result.into_outcome()
    }

    #[test]
    fn given_store_errors_then_only_unavailable_is_hard() {
        assert_eq!(classify(Ok(())).unwrap(), WriteOutcome::Applied);
        assert!(matches!(
            classify(Err(StoreError::NotFound("a".into()))),
            Ok(WriteOutcome::NotFound(_))
        ));
        assert_eq!(
            classify(Err(StoreError::WriteFailed {
                id: "a".into(),
                reason: "offline".into()
            }))
            .unwrap(),
            WriteOutcome::Failed("offline".into())
        );
        assert!(classify(Err(StoreError::Unavailable("down".into())))
            .unwrap_err()
            .is_unavailable());
    }
}
