//! Framework error type.
//!
//! `IxError` is the taxonomy every controller hook returns.  Sub-crates keep
//! their own narrower enums (`WorldError`, `ArbiterError`, …) and convert
//! into `IxError` via `From` impls, so `?` works inside controller code.
//!
//! | Variant               | Recovery                                              |
//! |-----------------------|-------------------------------------------------------|
//! | `StaleReference`      | abort the current session; never fatal                |
//! | `OwnershipConflict`   | requester waits, picks another entity, or aborts      |
//! | `TimerCallbackFault`  | isolated to one callback, logged                      |
//! | `InvariantViolation`  | logged at error level; offending session terminated   |
//! | `Config`              | reported at build time                                |

use thiserror::Error;

use crate::{ControllerId, EntityHandle, TimerId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IxError {
    #[error("stale entity reference {0}")]
    StaleReference(EntityHandle),

    #[error("{entity} is owned by {holder}; request from {requester} refused")]
    OwnershipConflict {
        entity:    EntityHandle,
        holder:    ControllerId,
        requester: ControllerId,
    },

    #[error("timer {timer} callback failed: {message}")]
    TimerCallbackFault {
        timer:   TimerId,
        message: String,
    },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IxError {
    /// `true` for errors that end only the current session and are expected
    /// in normal play (entity vanished, lost a claim race).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IxError::StaleReference(_) | IxError::OwnershipConflict { .. })
    }
}

/// Shorthand result type for all `ix-*` crates.
pub type IxResult<T> = Result<T, IxError>;
