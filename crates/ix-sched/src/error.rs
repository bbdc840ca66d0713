use ix_core::{ControllerId, IxError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedError {
    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error("{0} is neither registered nor pending")]
    UnknownController(ControllerId),
}

impl From<SchedError> for IxError {
    fn from(err: SchedError) -> Self {
        match err {
            SchedError::Config(msg) => IxError::Config(msg),
            other @ SchedError::UnknownController(_) => IxError::InvariantViolation(other.to_string()),
        }
    }
}

pub type SchedResult<T> = Result<T, SchedError>;
