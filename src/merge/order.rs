//! Flatten a [`PriorityMap`] into the replacement order.
//!
//! Negative ranks are dropped. The rest are visited in ascending rank, and
//! each rank's indices are shuffled before being appended, so ties are broken
//! uniformly at random while rank order stays strict.

use rand::Rng;
use rand::seq::SliceRandom;

use super::priority::PriorityMap;

/// Build the sequence of target slots that receive replacements, in order.
pub fn replacement_order<R: Rng + ?Sized>(map: &PriorityMap, rng: &mut R) -> Vec<usize> {
    let mut order = Vec::with_capacity(map.entry_count());
    for (_, indices) in map.iter().filter(|(priority, _)| *priority >= 0) {
        let mut tier = indices.to_vec();
        tier.shuffle(rng);
        order.extend(tier);
    }
    order
}
