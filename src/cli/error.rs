//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::StoreError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    #[error("cannot render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Application(ApplicationError::Store(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Output(_) => crate::exitcode::SOFTWARE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(DomainError::NotFound(_)) => crate::exitcode::NOINPUT,
                ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                ApplicationError::Store(StoreError::Io { .. }) => crate::exitcode::IOERR,
                ApplicationError::Store(StoreError::Serialization { .. }) => {
                    crate::exitcode::DATAERR
                }
                ApplicationError::Store(StoreError::MissingUnit(_)) => crate::exitcode::NOINPUT,
                ApplicationError::Store(_) => crate::exitcode::SOFTWARE,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitId;

    #[test]
    fn given_domain_errors_when_mapping_exit_code_then_distinguishes_not_found() {
        let not_found = CliError::from(ApplicationError::Domain(DomainError::NotFound(
            UnitId::new(),
        )));
        let rejected = CliError::from(ApplicationError::Domain(DomainError::HasDependents(
            UnitId::new(),
        )));

        assert_eq!(not_found.exit_code(), crate::exitcode::NOINPUT);
        assert_eq!(rejected.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(
            CliError::Usage("x".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
