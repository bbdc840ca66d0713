//! Cross-feature events and the bus that routes them.
//!
//! # Delivery
//!
//! `publish` only queues.  The scheduler drains the queue once per tick in
//! its event phase and hands each event to every subscriber of its kind, in
//! ascending `ControllerId` order.  Events published while that delivery is
//! running land in the queue again and are delivered on the next tick, so a
//! chain of reactions can never spin inside one tick.

use std::collections::BTreeMap;

use ix_arbiter::RevokeReason;
use ix_core::{ControllerId, EntityHandle, SubscriptionId};
use tracing::trace;

/// How a custody session ended when it ran to completion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The tap branch of the decision step.
    PathA,
    /// The hold branch of the decision step.
    PathB,
}

/// Why a session ended without reaching a decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbortReason {
    TargetGone,
    OwnershipDenied,
    OwnershipLost,
    TimedOut,
    /// A resisting target was not disarmed in time.
    Escaped,
    Cancelled,
}

/// Discriminant of [`InteractionEvent`]; subscriptions are keyed by it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    SessionStarted,
    TargetResisted,
    TargetDisarmed,
    SessionResolved,
    SessionAborted,
    OwnershipRevoked,
    DutyChanged,
    LightsChanged,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
    SessionStarted {
        session: ControllerId,
        feature: &'static str,
        target:  EntityHandle,
    },
    TargetResisted {
        session: ControllerId,
        target:  EntityHandle,
    },
    TargetDisarmed {
        session: ControllerId,
        target:  EntityHandle,
    },
    SessionResolved {
        session:    ControllerId,
        feature:    &'static str,
        target:     EntityHandle,
        resolution: Resolution,
    },
    SessionAborted {
        session: ControllerId,
        feature: &'static str,
        target:  EntityHandle,
        reason:  AbortReason,
    },
    /// The arbiter took a claim away from its owner.
    OwnershipRevoked {
        entity: EntityHandle,
        owner:  ControllerId,
        reason: RevokeReason,
    },
    DutyChanged {
        on_duty: bool,
    },
    LightsChanged {
        vehicle: EntityHandle,
        lights:  bool,
        siren:   bool,
    },
}

impl InteractionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InteractionEvent::SessionStarted { .. } => EventKind::SessionStarted,
            InteractionEvent::TargetResisted { .. } => EventKind::TargetResisted,
            InteractionEvent::TargetDisarmed { .. } => EventKind::TargetDisarmed,
            InteractionEvent::SessionResolved { .. } => EventKind::SessionResolved,
            InteractionEvent::SessionAborted { .. } => EventKind::SessionAborted,
            InteractionEvent::OwnershipRevoked { .. } => EventKind::OwnershipRevoked,
            InteractionEvent::DutyChanged { .. } => EventKind::DutyChanged,
            InteractionEvent::LightsChanged { .. } => EventKind::LightsChanged,
        }
    }

    /// The session controller an event is about, for session-scoped events.
    pub fn session(&self) -> Option<ControllerId> {
        match self {
            InteractionEvent::SessionStarted { session, .. }
            | InteractionEvent::TargetResisted { session, .. }
            | InteractionEvent::TargetDisarmed { session, .. }
            | InteractionEvent::SessionResolved { session, .. }
            | InteractionEvent::SessionAborted { session, .. } => Some(*session),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Subscription {
    subscriber: ControllerId,
    kind:       EventKind,
}

/// Typed publish/subscribe between controllers.
pub struct EventBus {
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    next_id:       SubscriptionId,
    queue:         Vec<InteractionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            next_id:       SubscriptionId(0),
            queue:         Vec::new(),
        }
    }

    /// Subscribe `subscriber` to every event of `kind`.
    ///
    /// Subscribing twice to the same kind returns the existing id, so an
    /// event is never delivered twice to one controller.
    pub fn subscribe(&mut self, subscriber: ControllerId, kind: EventKind) -> SubscriptionId {
        if let Some((&id, _)) = self
            .subscriptions
            .iter()
            .find(|(_, s)| s.subscriber == subscriber && s.kind == kind)
        {
            return id;
        }
        let id = self.next_id;
        self.next_id = id.next();
        self.subscriptions.insert(id, Subscription { subscriber, kind });
        trace!(subscription = id.0, %subscriber, ?kind, "subscribe");
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Drop every subscription held by `subscriber`.  Returns how many.
    pub fn unsubscribe_all(&mut self, subscriber: ControllerId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|_, s| s.subscriber != subscriber);
        before - self.subscriptions.len()
    }

    /// Queue `event` for the next delivery pass.
    pub fn publish(&mut self, event: InteractionEvent) {
        trace!(kind = ?event.kind(), "publish");
        self.queue.push(event);
    }

    /// Take everything published so far, in publication order.
    pub fn take_pending(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.queue)
    }

    /// Controllers subscribed to `kind`, ascending and without duplicates.
    pub fn subscribers(&self, kind: EventKind) -> Vec<ControllerId> {
        let mut out: Vec<ControllerId> = self
            .subscriptions
            .values()
            .filter(|s| s.kind == kind)
            .map(|s| s.subscriber)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn is_subscribed(&self, subscriber: ControllerId, kind: EventKind) -> bool {
        self.subscriptions
            .values()
            .any(|s| s.subscriber == subscriber && s.kind == kind)
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}
