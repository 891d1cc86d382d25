//! Record equivalence and spatial ordering.
//!
//! Equivalence drives the merge diff pass. It uses exact float comparison:
//! savedata stores canonical values, and proximity tolerance belongs to the
//! collision check, not here.

use std::cmp::Ordering;

use super::record::CarGenerator;

/// `true` iff every semantic field matches exactly.
///
/// Semantic fields are model, position, heading, enabled flag and the active
/// revision's aux pair. The runtime `timer` is ignored.
#[must_use]
pub fn equivalent(a: &CarGenerator, b: &CarGenerator) -> bool {
    a.model == b.model
        && a.position == b.position
        && a.heading == b.heading
        && a.enabled == b.enabled
        && a.aux == b.aux
}

/// Order two records by distance of their position from the origin.
///
/// This is independent of [`equivalent`]: records at equal magnitude compare
/// `Equal` even when they differ.
#[must_use]
pub fn cmp_by_magnitude(a: &CarGenerator, b: &CarGenerator) -> Ordering {
    a.position.length().total_cmp(&b.position.length())
}
