//! Fixed-capacity car-generator block.
//!
//! A block always holds exactly `capacity` slots. Slots are overwritten, never
//! inserted or removed, and the slot index is a record's identity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::CarGenerator;
use super::types::FormatRevision;

/// Errors from slot-level block access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// A write addressed a slot past the end of the block.
    #[error("slot {index} is out of range (capacity {capacity})")]
    SlotOutOfRange { index: usize, capacity: usize },
}

/// The car generators of one dataset plus the two derived counters the game
/// reads at load time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarGeneratorBlock {
    /// Total generator count. Set to capacity by [`Self::recompute_counters`].
    pub num_car_generators: usize,
    /// Number of non-empty, enabled slots.
    pub num_enabled_car_generators: usize,
    #[serde(rename = "car_generators")]
    slots: Vec<CarGenerator>,
}

impl CarGeneratorBlock {
    /// A block of `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: usize, revision: FormatRevision) -> Self {
        Self {
            num_car_generators: capacity,
            num_enabled_car_generators: 0,
            slots: vec![CarGenerator::empty(revision); capacity],
        }
    }

    /// Build a block from existing slots. Counters are recomputed.
    #[must_use]
    pub fn from_slots(slots: Vec<CarGenerator>) -> Self {
        let mut block = Self {
            num_car_generators: 0,
            num_enabled_car_generators: 0,
            slots,
        };
        block.recompute_counters();
        block
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CarGenerator> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CarGenerator> {
        self.slots.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CarGenerator] {
        &self.slots
    }

    /// Overwrite slot `index`, clearing the record's runtime timer.
    ///
    /// # Errors
    /// Returns [`BlockError::SlotOutOfRange`] if `index >= capacity`.
    pub fn set(&mut self, index: usize, record: &CarGenerator) -> Result<(), BlockError> {
        let capacity = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BlockError::SlotOutOfRange { index, capacity })?;
        *slot = record.placed();
        Ok(())
    }

    /// Count of non-empty, enabled slots, computed from the slots themselves.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.slots.iter().filter(|cg| cg.is_active()).count()
    }

    /// Reset both counters from a full scan of the slots.
    pub fn recompute_counters(&mut self) {
        self.num_car_generators = self.slots.len();
        self.num_enabled_car_generators = self.enabled_count();
    }
}

impl<'a> IntoIterator for &'a CarGeneratorBlock {
    type Item = &'a CarGenerator;
    type IntoIter = std::slice::Iter<'a, CarGenerator>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
