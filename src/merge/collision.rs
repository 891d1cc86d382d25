//! Spatial collision veto.
//!
//! A replacement is refused when its position lies within the collision
//! radius of any occupied slot in the target block. The scan runs in slot
//! order and reports the first (lowest-index) hit.

use crate::model::{CarGenerator, CarGeneratorBlock};

/// The occupied slot a candidate came too close to.
#[derive(Clone, Debug, PartialEq)]
pub struct Collision {
    pub slot: usize,
    pub distance: f32,
    /// The record held by `slot` when the check ran.
    pub occupant: CarGenerator,
}

/// Proximity check against a target block.
///
/// A radius of zero or less disables the check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionDetector {
    radius: f32,
}

impl CollisionDetector {
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.radius > 0.0
    }

    /// First occupied slot within `radius` of `candidate`, if any.
    #[must_use]
    pub fn find(&self, candidate: &CarGenerator, block: &CarGeneratorBlock) -> Option<Collision> {
        if !self.is_enabled() {
            return None;
        }
        block
            .iter()
            .enumerate()
            .filter(|(_, occupant)| !occupant.is_empty())
            .find_map(|(slot, occupant)| {
                let distance = candidate.position.distance(occupant.position);
                (distance <= self.radius).then(|| Collision {
                    slot,
                    distance,
                    occupant: occupant.clone(),
                })
            })
    }
}
