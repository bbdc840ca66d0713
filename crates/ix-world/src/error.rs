use ix_core::{EntityHandle, IxError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("entity {0} does not exist")]
    Stale(EntityHandle),

    #[error("command {command} is not applicable to {entity}")]
    Unsupported {
        entity:  EntityHandle,
        command: &'static str,
    },
}

impl From<WorldError> for IxError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::Stale(entity) => IxError::StaleReference(entity),
            other => IxError::InvariantViolation(other.to_string()),
        }
    }
}

pub type WorldResult<T> = Result<T, WorldError>;
