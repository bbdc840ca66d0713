//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Controller ids are handed out in
//! ascending order by the scheduler, so sorting by `ControllerId` is the same
//! as sorting by registration order.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// `true` unless this is the `INVALID` sentinel.
            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }

            /// The id that follows `self` in allocation order.
            #[inline(always)]
            pub fn next(self) -> $name {
                $name(self.0 + 1)
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Identity of a registered interaction controller.
    pub struct ControllerId(u32);
}

typed_id! {
    /// Identity of a scheduled timer.  Never reused within one scheduler.
    pub struct TimerId(u64);
}

typed_id! {
    /// Identity of one event-bus subscription.
    pub struct SubscriptionId(u32);
}

// ── EntityHandle ──────────────────────────────────────────────────────────────

/// A reference to an actor or vehicle in the external world simulation.
///
/// The handle carries no payload.  Whether it still refers to something is
/// answered only by the world (`World::exists`).  When the world recycles a
/// slot it bumps the slot's generation, so a handle kept across a despawn is
/// detectably stale instead of silently aliasing the new occupant.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityHandle {
    pub index:      u32,
    pub generation: u32,
}

impl EntityHandle {
    /// Sentinel that no world ever reports as existing.
    pub const INVALID: EntityHandle = EntityHandle { index: u32::MAX, generation: u32::MAX };

    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Cast the slot index to `usize` for direct `Vec` indexing.
    #[inline(always)]
    pub fn slot(self) -> usize {
        self.index as usize
    }
}

impl Default for EntityHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}
