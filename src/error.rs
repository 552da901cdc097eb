use near_sdk::FunctionError;
use thiserror::Error;

/// Every way a remittance call can be refused. The message is what the
/// failed receipt reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, FunctionError)]
pub enum RemittanceError {
    #[error("InvalidInput: {0}")]
    InvalidInput(&'static str),
    #[error("Conflict: account already used, pick unique passwords")]
    Conflict,
    #[error("NotFound: {0}")]
    NotFound(&'static str),
    #[error("Unauthorized: only sender can cancel the payment")]
    Unauthorized,
    #[error("Expired: account should not be expired")]
    Expired,
    #[error("TooEarly: account is not yet expired")]
    TooEarly,
}

pub type RemittanceResult<T> = Result<T, RemittanceError>;
