use thiserror::Error;

/// RFC value handling errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    CoreError(#[from] tessen_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
