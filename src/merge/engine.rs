//! The merge orchestrator.
//!
//! Drives one run through `Diffing → Ordering → Replacing → Finalizing`:
//!
//! 1. collect candidates from every source ([`collect_candidates`]);
//! 2. flatten the priority map into the replacement order
//!    ([`replacement_order`]);
//! 3. walk the order, giving each slot the next candidate unless the
//!    candidate collides with an occupied slot of the *current* target block;
//! 4. recompute the block counters and stamp title/timestamp.
//!
//! # Abort semantics
//!
//! A collision stops the run at once. By default, writes made earlier in the
//! pass stay applied to the target (the caller decides whether to persist
//! it). With [`MergeOptions::atomic`], the pass runs on a staged copy of the
//! block that only replaces the target once the whole pass is collision-free.

use rand::Rng;

use crate::dataset::SaveDataset;
use crate::model::CarGeneratorBlock;

use super::collision::CollisionDetector;
use super::diff::collect_candidates;
use super::order::replacement_order;
use super::priority::PriorityMap;
use super::types::{CollisionReport, MergeOutcome, MergePhase, MergeSummary};

/// Collision radius used when none is configured.
pub const DEFAULT_RADIUS: f32 = 10.0;

/// Per-run knobs.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOptions {
    /// Collision radius in world units. `<= 0` disables the check.
    pub radius: f32,
    /// Commit replacements only if the whole pass is collision-free.
    pub atomic: bool,
    /// New in-game title for the target, if any.
    pub title: Option<String>,
    /// Last-saved timestamp (Unix seconds) to stamp on the target, if any.
    pub timestamp: Option<u64>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            atomic: false,
            title: None,
            timestamp: None,
        }
    }
}

/// Where the priority map comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrioritySource {
    /// A map built from a user-supplied priority list.
    Provided(PriorityMap),
    /// Replace slots in a uniformly random order.
    Random,
}

/// One merge run over a target dataset.
pub struct Merger<'r, R: Rng + ?Sized> {
    options: MergeOptions,
    rng: &'r mut R,
    phase: MergePhase,
}

impl<'r, R: Rng + ?Sized> Merger<'r, R> {
    pub fn new(options: MergeOptions, rng: &'r mut R) -> Self {
        Self {
            options,
            rng,
            phase: MergePhase::Diffing,
        }
    }

    fn advance(&mut self, next: MergePhase) {
        debug_assert!(
            self.phase.can_transition_to(&next),
            "invalid merge transition {} -> {next}",
            self.phase
        );
        tracing::debug!(from = %self.phase, to = %next, "merge phase");
        self.phase = next;
    }

    /// Merge `sources` into `target`.
    ///
    /// Sources are read-only. The target block is mutated in place; see the
    /// module docs for what survives an abort.
    pub fn run(
        mut self,
        target: &mut SaveDataset,
        sources: &[&CarGeneratorBlock],
        priority: PrioritySource,
    ) -> MergeOutcome {
        // Diffing
        let diff = collect_candidates(&target.car_generators, sources.iter().copied());
        let mut summary = MergeSummary {
            differing_per_source: diff.per_source.clone(),
            differing_total: diff.total(),
            ..MergeSummary::default()
        };
        self.advance(MergePhase::Ordering);

        // Ordering
        let capacity = target.car_generators.capacity();
        let map = match priority {
            PrioritySource::Provided(map) => map,
            PrioritySource::Random => PriorityMap::generate(capacity, &mut *self.rng),
        };
        let order = replacement_order(&map, &mut *self.rng);
        tracing::debug!(
            candidates = diff.total(),
            order_len = order.len(),
            "replacement order built"
        );
        self.advance(MergePhase::Replacing);

        // Replacing
        let detector = CollisionDetector::new(self.options.radius);
        let mut staged = self.options.atomic.then(|| target.car_generators.clone());
        let mut candidates = diff.candidates.into_iter();

        for destination in order {
            // Out-of-range entries leave the candidate for the next slot.
            if destination >= capacity {
                tracing::warn!(
                    slot = destination,
                    capacity,
                    "skipping replacement: slot outside the target block"
                );
                continue;
            }
            let Some(candidate) = candidates.next() else {
                break;
            };
            let block = staged.as_mut().unwrap_or(&mut target.car_generators);

            if let Some(hit) = detector.find(&candidate.record, block) {
                let report = CollisionReport {
                    destination,
                    target_slot: hit.slot,
                    distance: hit.distance,
                    candidate,
                    occupant: hit.occupant,
                };
                tracing::error!("{report}");
                if staged.is_some() {
                    summary.replaced = 0;
                    summary.rolled_back = true;
                }
                self.advance(MergePhase::Aborted);
                return MergeOutcome::Aborted {
                    summary,
                    collision: Box::new(report),
                };
            }

            if let Err(e) = block.set(destination, &candidate.record) {
                tracing::warn!("skipping replacement: {e}");
                continue;
            }
            summary.replaced += 1;
            tracing::debug!(
                slot = destination,
                enabled = candidate.record.enabled,
                model = candidate.record.model,
                location = %candidate.record.position,
                "wrote slot"
            );
        }

        let dropped = candidates.len();
        if dropped > 0 {
            tracing::debug!(dropped, "replacement order exhausted before candidates");
        }
        if let Some(block) = staged {
            target.car_generators = block;
        }
        self.advance(MergePhase::Finalizing);

        // Finalizing
        target.car_generators.recompute_counters();
        if let Some(title) = &self.options.title {
            target.name.clone_from(title);
            tracing::info!("title set to: {}", target.name);
        }
        if let Some(ts) = self.options.timestamp {
            target.time_last_saved = ts;
        }
        self.advance(MergePhase::Done);

        MergeOutcome::Completed(summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::model::{CarGenerator, FormatRevision, Game};

    fn rec(model: u32, pos: Vec3) -> CarGenerator {
        CarGenerator {
            model,
            position: pos,
            heading: 0.0,
            enabled: true,
            ..CarGenerator::empty(FormatRevision::Colors)
        }
    }

    /// Dataset whose block holds exactly `slots`.
    fn dataset(slots: Vec<CarGenerator>) -> SaveDataset {
        let mut ds = SaveDataset::new(Game::Gta3, FormatRevision::Colors, "test");
        ds.car_generators = CarGeneratorBlock::from_slots(slots);
        ds
    }

    /// Target `[A, B, C(empty), D]` spaced 2000 units apart.
    fn abcd() -> Vec<CarGenerator> {
        vec![
            rec(1, Vec3::new(0.0, 0.0, 0.0)),
            rec(2, Vec3::new(2000.0, 0.0, 0.0)),
            CarGenerator::empty(FormatRevision::Colors),
            rec(4, Vec3::new(6000.0, 0.0, 0.0)),
        ]
    }

    fn map(entries: &[(i32, usize)]) -> PrioritySource {
        PrioritySource::Provided(entries.iter().copied().collect())
    }

    fn opts(radius: f32) -> MergeOptions {
        MergeOptions {
            radius,
            ..MergeOptions::default()
        }
    }

    #[test]
    fn single_difference_replaces_one_slot() {
        let mut target = dataset(abcd());
        let mut src = abcd();
        src[1] = rec(9, Vec3::new(4000.0, 0.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src.clone());

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = Merger::new(opts(1000.0), &mut rng)
            .run(&mut target, &[&source], map(&[(0, 1)]));

        let summary = outcome.summary();
        assert!(outcome.is_completed());
        assert_eq!(summary.differing_total, 1);
        assert_eq!(summary.differing_per_source, vec![1]);
        assert_eq!(summary.replaced, 1);

        let got = target.car_generators.as_slice();
        assert_eq!(got[0], abcd()[0]);
        assert_eq!(got[1], src[1]);
        assert_eq!(got[2], abcd()[2]);
        assert_eq!(got[3], abcd()[3]);
        assert_eq!(target.car_generators.num_enabled_car_generators, 3);
        assert_eq!(target.car_generators.num_car_generators, 4);
    }

    #[test]
    fn collision_aborts_before_write() {
        let mut target = dataset(abcd());
        target
            .car_generators
            .set(2, &rec(3, Vec3::new(4500.0, 0.0, 0.0)))
            .unwrap();
        let before = target.clone();

        let mut src = before.car_generators.as_slice().to_vec();
        src[1] = rec(9, Vec3::new(4000.0, 0.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src);

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = Merger::new(opts(1000.0), &mut rng)
            .run(&mut target, &[&source], map(&[(0, 1)]));

        let MergeOutcome::Aborted { summary, collision } = outcome else {
            panic!("expected abort");
        };
        assert_eq!(collision.target_slot, 2);
        assert_eq!(collision.destination, 1);
        assert!(collision.distance <= 1000.0);
        assert_eq!(collision.occupant.model, 3);
        assert_eq!(collision.candidate.record.model, 9);
        assert_eq!(summary.replaced, 0);
        assert_eq!(target.car_generators, before.car_generators);
    }

    #[test]
    fn zero_radius_never_collides() {
        let mut target = dataset(abcd());
        let mut src = abcd();
        src[1] = rec(9, Vec3::new(0.0, 0.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src);

        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            Merger::new(opts(0.0), &mut rng).run(&mut target, &[&source], map(&[(0, 1)]));
        assert!(outcome.is_completed());
        assert_eq!(outcome.summary().replaced, 1);
    }

    #[test]
    fn merging_with_itself_is_a_no_op() {
        let mut target = dataset(abcd());
        let copy = target.car_generators.clone();

        let mut rng = StdRng::seed_from_u64(5);
        let outcome = Merger::new(opts(10.0), &mut rng)
            .run(&mut target, &[&copy], PrioritySource::Random);
        assert_eq!(outcome.summary().differing_total, 0);
        assert_eq!(outcome.summary().replaced, 0);
        assert_eq!(target.car_generators.as_slice(), copy.as_slice());
    }

    #[test]
    fn placement_follows_order_not_origin() {
        let mut target = dataset(abcd());
        let mut src = abcd();
        src[0] = rec(7, Vec3::new(9000.0, 0.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src.clone());

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = Merger::new(opts(100.0), &mut rng)
            .run(&mut target, &[&source], map(&[(0, 2)]));
        assert_eq!(outcome.summary().replaced, 1);
        assert_eq!(target.car_generators.get(2), Some(&src[0]));
        assert_eq!(target.car_generators.get(0), Some(&abcd()[0]));
    }

    #[test]
    fn excess_candidates_are_dropped() {
        let mut target = dataset(abcd());
        let src: Vec<CarGenerator> = (0..4)
            .map(|i| rec(50 + i, Vec3::new(20_000.0 + 1000.0 * i as f32, 0.0, 0.0)))
            .collect();
        let source = CarGeneratorBlock::from_slots(src);

        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            Merger::new(opts(10.0), &mut rng).run(&mut target, &[&source], map(&[(0, 3), (1, 2)]));
        assert_eq!(outcome.summary().differing_total, 4);
        assert_eq!(outcome.summary().replaced, 2);
        assert_eq!(target.car_generators.get(3).map(|c| c.model), Some(50));
        assert_eq!(target.car_generators.get(2).map(|c| c.model), Some(51));
    }

    #[test]
    fn out_of_range_entries_do_not_consume_candidates() {
        let mut target = dataset(abcd());
        let mut src = abcd();
        src[0] = rec(70, Vec3::new(0.0, 30_000.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src);

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = Merger::new(opts(10.0), &mut rng).run(
            &mut target,
            &[&source],
            map(&[(0, 10), (1, 2)]),
        );
        assert!(outcome.is_completed());
        assert_eq!(outcome.summary().differing_total, 1);
        assert_eq!(outcome.summary().replaced, 1);
        assert_eq!(target.car_generators.get(2).map(|c| c.model), Some(70));
        assert_eq!(target.car_generators.capacity(), 4);
    }

    #[test]
    fn excluded_slots_are_never_written() {
        let mut target = dataset(abcd());
        let src: Vec<CarGenerator> = (0..4)
            .map(|i| rec(50 + i, Vec3::new(20_000.0 + 1000.0 * i as f32, 0.0, 0.0)))
            .collect();
        let source = CarGeneratorBlock::from_slots(src);

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = Merger::new(opts(10.0), &mut rng).run(
            &mut target,
            &[&source],
            map(&[(-1, 0), (-1, 1), (0, 2), (0, 3)]),
        );
        assert_eq!(outcome.summary().replaced, 2);
        assert_eq!(target.car_generators.get(0), Some(&abcd()[0]));
        assert_eq!(target.car_generators.get(1), Some(&abcd()[1]));
    }

    #[test]
    fn later_candidates_see_earlier_writes() {
        let mut target = dataset(abcd());
        let mut src = abcd();
        // Both land near each other, far from every original target slot.
        src[0] = rec(10, Vec3::new(0.0, 9000.0, 0.0));
        src[1] = rec(11, Vec3::new(0.0, 9005.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src);

        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            Merger::new(opts(10.0), &mut rng).run(&mut target, &[&source], map(&[(0, 2), (1, 3)]));
        let MergeOutcome::Aborted { summary, collision } = outcome else {
            panic!("expected abort");
        };
        assert_eq!(collision.target_slot, 2);
        assert_eq!(collision.destination, 3);
        // Partial-apply: the first write stays in the target.
        assert_eq!(summary.replaced, 1);
        assert!(!summary.rolled_back);
        assert_eq!(target.car_generators.get(2).map(|c| c.model), Some(10));
    }

    #[test]
    fn atomic_abort_leaves_target_untouched() {
        let mut target = dataset(abcd());
        let before = target.car_generators.clone();
        let mut src = abcd();
        src[0] = rec(10, Vec3::new(0.0, 9000.0, 0.0));
        src[1] = rec(11, Vec3::new(0.0, 9005.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src);

        let options = MergeOptions {
            atomic: true,
            ..opts(10.0)
        };
        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            Merger::new(options, &mut rng).run(&mut target, &[&source], map(&[(0, 2), (1, 3)]));
        let MergeOutcome::Aborted { summary, collision } = outcome else {
            panic!("expected abort");
        };
        assert_eq!(collision.target_slot, 2);
        assert!(summary.rolled_back);
        assert_eq!(summary.replaced, 0);
        assert_eq!(target.car_generators, before);
    }

    #[test]
    fn atomic_success_commits() {
        let mut target = dataset(abcd());
        let mut src = abcd();
        src[1] = rec(9, Vec3::new(4000.0, 0.0, 0.0));
        let source = CarGeneratorBlock::from_slots(src);

        let options = MergeOptions {
            atomic: true,
            ..opts(10.0)
        };
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = Merger::new(options, &mut rng).run(&mut target, &[&source], map(&[(0, 1)]));
        assert!(outcome.is_completed());
        assert_eq!(target.car_generators.get(1).map(|c| c.model), Some(9));
    }

    #[test]
    fn finalizing_stamps_metadata() {
        let mut target = dataset(abcd());
        let options = MergeOptions {
            title: Some("Merged".into()),
            timestamp: Some(1_600_000_000),
            ..opts(10.0)
        };
        let copy = target.car_generators.clone();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            Merger::new(options, &mut rng).run(&mut target, &[&copy], PrioritySource::Random);
        assert!(outcome.is_completed());
        assert_eq!(target.name, "Merged");
        assert_eq!(target.time_last_saved, 1_600_000_000);
    }

    #[test]
    fn random_order_is_reproducible_with_seed() {
        let src: Vec<CarGenerator> = (0..4)
            .map(|i| rec(60 + i, Vec3::new(0.0, 50_000.0 + 1000.0 * i as f32, 0.0)))
            .collect();
        let source = CarGeneratorBlock::from_slots(src);

        let run = |seed| {
            let mut target = dataset(abcd());
            let mut rng = StdRng::seed_from_u64(seed);
            Merger::new(opts(10.0), &mut rng).run(&mut target, &[&source], PrioritySource::Random);
            target.car_generators
        };
        assert_eq!(run(11), run(11));
    }
}
