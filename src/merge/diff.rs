//! DIFF step: find the source records that differ from the target.
//!
//! Sources are compared against the target slot-by-slot, by index. A source
//! slot becomes a [`Candidate`] when it is non-empty and not
//! [`equivalent`](crate::model::compare::equivalent) to the target slot at
//! the same index. Candidates are collected in source order, then slot order.
//!
//! Where a candidate was observed says nothing about where it will be placed;
//! placement is decided entirely by the replacement order.

use crate::model::CarGeneratorBlock;
use crate::model::compare::equivalent;

use super::types::Candidate;

/// Candidates from every source, plus a per-source count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiffResult {
    pub candidates: Vec<Candidate>,
    /// Number of candidates contributed by each source, in source order.
    pub per_source: Vec<usize>,
}

impl DiffResult {
    #[must_use]
    pub fn total(&self) -> usize {
        self.candidates.len()
    }
}

/// Compare every source block against `target`.
///
/// Only the first `target.capacity()` slots of each source are inspected.
#[must_use]
pub fn collect_candidates<'a, I>(target: &CarGeneratorBlock, sources: I) -> DiffResult
where
    I: IntoIterator<Item = &'a CarGeneratorBlock>,
{
    let mut result = DiffResult::default();

    for (source_index, source) in sources.into_iter().enumerate() {
        let before = result.candidates.len();
        for (slot, (tgt, src)) in target.iter().zip(source.iter()).enumerate() {
            if !src.is_empty() && !equivalent(src, tgt) {
                tracing::debug!(source = source_index, slot, "difference found");
                result.candidates.push(Candidate {
                    source: source_index,
                    slot,
                    record: src.clone(),
                });
            }
        }
        result.per_source.push(result.candidates.len() - before);
    }

    result
}
