//! The `OwnershipArbiter` and its claim table.

use ix_core::{ControllerId, EntityHandle, Tick};
use ix_world::{World, WorldCommand};
use tracing::{debug, warn};

use crate::{
    ArbiterError, ArbiterResult, Claim, ClaimOptions, Grant, RevokeReason, Revocation,
};

#[cfg(feature = "fx-hash")]
type ClaimMap = rustc_hash::FxHashMap<EntityHandle, Claim>;
#[cfg(not(feature = "fx-hash"))]
type ClaimMap = std::collections::HashMap<EntityHandle, Claim>;

/// Tracks, per entity, which controller has exclusive behavioral authority.
///
/// Every method that returns several entities returns them sorted by handle,
/// so callers iterating the result behave identically run to run.
#[derive(Default)]
pub struct OwnershipArbiter {
    claims: ClaimMap,
}

impl OwnershipArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Request / release ─────────────────────────────────────────────────

    /// Ask for exclusive control of `entity` on behalf of `requester`.
    ///
    /// * no claim          → `Granted`; the entity's task queue is cleared
    /// * claim by `requester` → `AlreadyHeld`; nothing changes
    /// * claim by another  → `Conflict`; the existing claim is untouched
    /// * entity gone       → `Stale`
    pub fn request(
        &mut self,
        entity:    EntityHandle,
        requester: ControllerId,
        options:   ClaimOptions,
        now:       Tick,
        world:     &mut dyn World,
    ) -> ArbiterResult<Grant> {
        if !world.exists(entity) {
            return Err(ArbiterError::Stale(entity));
        }
        if let Some(claim) = self.claims.get(&entity) {
            if claim.owner == requester {
                return Ok(Grant::AlreadyHeld);
            }
            debug!(%entity, holder = %claim.owner, %requester, "ownership conflict");
            return Err(ArbiterError::Conflict {
                entity,
                holder: claim.owner,
                priority: claim.priority,
                requester,
            });
        }

        world.apply(entity, WorldCommand::ClearTasks)?;
        self.claims.insert(entity, Claim {
            entity,
            owner:      requester,
            granted_at: now,
            priority:   options.priority,
            expires_at: options.ttl_ticks.map(|ttl| now.offset(ttl)),
        });
        debug!(%entity, owner = %requester, %now, "ownership granted");
        Ok(Grant::Granted)
    }

    /// Drop `owner`'s claim on `entity`.  No-op (returns `false`) when
    /// `owner` does not hold it.
    pub fn release(&mut self, entity: EntityHandle, owner: ControllerId) -> bool {
        match self.claims.get(&entity) {
            Some(claim) if claim.owner == owner => {
                self.claims.remove(&entity);
                debug!(%entity, %owner, "ownership released");
                true
            }
            _ => false,
        }
    }

    /// Drop every claim held by `owner`.
    pub fn release_all(&mut self, owner: ControllerId) -> Vec<EntityHandle> {
        let released = self.owned_by(owner);
        for entity in &released {
            self.claims.remove(entity);
        }
        if !released.is_empty() {
            debug!(%owner, count = released.len(), "released all claims");
        }
        released
    }

    /// Hand `entity` from `from` to `to`: an explicit release followed by a
    /// fresh request.  On any error (`from` is not the owner, the entity is
    /// gone, the world refuses `ClearTasks`) the claim stays with `from`.
    pub fn transfer(
        &mut self,
        entity:  EntityHandle,
        from:    ControllerId,
        to:      ControllerId,
        options: ClaimOptions,
        now:     Tick,
        world:   &mut dyn World,
    ) -> ArbiterResult<Grant> {
        if self.current_owner(entity) != Some(from) {
            return Err(ArbiterError::NotOwner { entity, controller: from });
        }
        let Some(previous) = self.claims.remove(&entity) else {
            return Err(ArbiterError::NotOwner { entity, controller: from });
        };
        match self.request(entity, to, options, now, world) {
            Ok(grant) => {
                debug!(%entity, %from, %to, "ownership transferred");
                Ok(grant)
            }
            Err(err) => {
                self.claims.insert(entity, previous);
                Err(err)
            }
        }
    }

    // ── Maintenance ───────────────────────────────────────────────────────

    /// Remove expired claims and, when `auto_release_dead` is set, claims on
    /// entities that no longer exist.
    pub fn sweep(
        &mut self,
        now:               Tick,
        world:             &dyn World,
        auto_release_dead: bool,
    ) -> Vec<Revocation> {
        let mut revoked: Vec<Revocation> = self
            .claims
            .values()
            .filter_map(|claim| {
                let reason = if claim.is_expired(now) {
                    RevokeReason::Expired
                } else if auto_release_dead && !world.exists(claim.entity) {
                    RevokeReason::EntityGone
                } else {
                    return None;
                };
                Some(Revocation { entity: claim.entity, owner: claim.owner, reason })
            })
            .collect();
        revoked.sort_by_key(|r| r.entity);
        for r in &revoked {
            self.claims.remove(&r.entity);
            debug!(entity = %r.entity, owner = %r.owner, reason = ?r.reason, "claim revoked");
        }
        revoked
    }

    /// Remove claims whose owner fails `is_live`.  Finding any is a bug in
    /// the caller's cleanup path, so each one is logged as a warning.
    pub fn audit(&mut self, is_live: impl Fn(ControllerId) -> bool) -> Vec<Revocation> {
        let mut orphaned: Vec<Revocation> = self
            .claims
            .values()
            .filter(|c| !is_live(c.owner))
            .map(|c| Revocation { entity: c.entity, owner: c.owner, reason: RevokeReason::OwnerGone })
            .collect();
        orphaned.sort_by_key(|r| r.entity);
        for r in &orphaned {
            warn!(entity = %r.entity, owner = %r.owner, "claim held by unregistered controller; releasing");
            self.claims.remove(&r.entity);
        }
        orphaned
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn current_owner(&self, entity: EntityHandle) -> Option<ControllerId> {
        self.claims.get(&entity).map(|c| c.owner)
    }

    pub fn claim(&self, entity: EntityHandle) -> Option<&Claim> {
        self.claims.get(&entity)
    }

    pub fn is_owned_by(&self, entity: EntityHandle, owner: ControllerId) -> bool {
        self.current_owner(entity) == Some(owner)
    }

    /// Entities held by `owner`, sorted.
    pub fn owned_by(&self, owner: ControllerId) -> Vec<EntityHandle> {
        let mut owned: Vec<EntityHandle> = self
            .claims
            .values()
            .filter(|c| c.owner == owner)
            .map(|c| c.entity)
            .collect();
        owned.sort_unstable();
        owned
    }

    /// Number of active claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
