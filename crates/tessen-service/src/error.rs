use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] tessen_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] tessen_core::error::CoreError),

    #[error(transparent)]
    ComponentError(#[from] crate::calendar::ComponentError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
