use ix_core::{ControllerId, EntityHandle, IxError};
use ix_world::WorldError;
use thiserror::Error;

use crate::Priority;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArbiterError {
    #[error("entity {0} does not exist")]
    Stale(EntityHandle),

    #[error("{entity} is held by {holder} (priority {priority:?}); {requester} refused")]
    Conflict {
        entity:    EntityHandle,
        holder:    ControllerId,
        priority:  Priority,
        requester: ControllerId,
    },

    #[error("{controller} does not own {entity}")]
    NotOwner {
        entity:     EntityHandle,
        controller: ControllerId,
    },

    #[error("world rejected ownership side effect: {0}")]
    World(#[from] WorldError),
}

impl From<ArbiterError> for IxError {
    fn from(err: ArbiterError) -> Self {
        match err {
            ArbiterError::Stale(entity) => IxError::StaleReference(entity),
            ArbiterError::Conflict { entity, holder, requester, .. } => {
                IxError::OwnershipConflict { entity, holder, requester }
            }
            ArbiterError::World(world) => world.into(),
            other @ ArbiterError::NotOwner { .. } => IxError::InvariantViolation(other.to_string()),
        }
    }
}

pub type ArbiterResult<T> = Result<T, ArbiterError>;
