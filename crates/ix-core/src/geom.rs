//! World-space position type.
//!
//! The core never simulates movement; positions are read from the world only
//! to evaluate trigger conditions such as "target within interaction radius".

/// A point in world space, in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance in metres.
    #[inline]
    pub fn distance(self, other: Vec3) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance; cheaper when only comparing against a radius.
    #[inline]
    pub fn distance_sq(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// `true` if `other` lies within `radius` metres of `self`.
    #[inline]
    pub fn within(self, other: Vec3, radius: f32) -> bool {
        self.distance_sq(other) <= radius * radius
    }
}
