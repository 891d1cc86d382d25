//! Car-generator merge engine.
//!
//! Implements the diff → order → replace → finalize pipeline. Each step is a
//! separate module:
//!
//! - **diff**: compare every source block against the target slot-by-slot and
//!   collect the differing records as candidates.
//! - **priority**: build the rank → slots map, from a priority list or as a
//!   random permutation.
//! - **order**: flatten the map into the replacement order, shuffling ties.
//! - **collision**: refuse a candidate that lands within the collision radius
//!   of an occupied target slot.
//! - **engine**: drive the phases over a target dataset ([`Merger`]).
//!
//! # Randomness
//!
//! Every random choice draws from the `Rng` handed to [`Merger::new`]. A run
//! with a seeded generator is reproducible.

pub mod collision;
pub mod diff;
pub mod engine;
pub mod order;
pub mod priority;
pub mod types;

pub use engine::{DEFAULT_RADIUS, MergeOptions, Merger, PrioritySource};
pub use priority::{PriorityMap, PriorityWarning};
pub use types::{Candidate, CollisionReport, MergeOutcome, MergePhase, MergeSummary};
