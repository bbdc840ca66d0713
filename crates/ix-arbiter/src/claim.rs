//! Claim records and the values the arbiter hands back.

use ix_core::{ControllerId, EntityHandle, Tick};

/// Advisory importance of a claim.  Reported to losing requesters so they
/// can decide whether to wait; never used to pre-empt.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Optional metadata attached to a request.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimOptions {
    pub priority: Priority,
    /// Claim lapses this many ticks after being granted.
    pub ttl_ticks: Option<u64>,
}

impl ClaimOptions {
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn ttl(mut self, ticks: u64) -> Self {
        self.ttl_ticks = Some(ticks);
        self
    }
}

/// One active (entity, controller) ownership pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim {
    pub entity:     EntityHandle,
    pub owner:      ControllerId,
    pub granted_at: Tick,
    pub priority:   Priority,
    pub expires_at: Option<Tick>,
}

impl Claim {
    pub fn is_expired(&self, now: Tick) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }
}

/// Successful outcome of a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Grant {
    /// A new claim was created and the entity's task queue cleared.
    Granted,
    /// The requester already held the entity; nothing changed.
    AlreadyHeld,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevokeReason {
    Expired,
    /// The entity stopped existing while owned.
    EntityGone,
    /// The owning controller was no longer registered.
    OwnerGone,
}

/// A claim removed by the arbiter rather than by its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revocation {
    pub entity: EntityHandle,
    pub owner:  ControllerId,
    pub reason: RevokeReason,
}
