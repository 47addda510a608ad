//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::traits::StoreError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Infra(InfraError::Store(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Store(StoreError::Unavailable(_)) => exitcode::UNAVAILABLE,
                InfraError::Store(StoreError::NotFound(_)) => exitcode::NOINPUT,
                InfraError::Store(StoreError::WriteFailed { .. }) => exitcode::SOFTWARE,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::CycleDetected(_)) => exitcode::DATAERR,
                    ApplicationError::Domain(DomainError::NodeNotFound(_)) => exitcode::NOINPUT,
                    ApplicationError::StoreUnavailable { .. } => exitcode::UNAVAILABLE,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::WriteRejected { .. }
                    | ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
                },
            },
        }
    }
}
