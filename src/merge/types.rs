//! Shared types for the merge engine.

use std::fmt;

use serde::Serialize;

use crate::model::CarGenerator;

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A source record that differs from the target slot at the same index.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Position of the source in the source list.
    pub source: usize,
    /// Slot the difference was observed at.
    pub slot: usize,
    pub record: CarGenerator,
}

// ---------------------------------------------------------------------------
// MergePhase
// ---------------------------------------------------------------------------

/// The phase a merge run is in.
///
/// ```text
/// Diffing → Ordering → Replacing → Finalizing → Done
///                          │
///                          └→ Aborted
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePhase {
    /// Compare sources against the target slot-by-slot.
    Diffing,
    /// Flatten the priority map into the replacement order.
    Ordering,
    /// Write candidates into the slots the order names.
    Replacing,
    /// Recompute block counters and stamp dataset metadata.
    Finalizing,
    /// Merge completed.
    Done,
    /// A collision stopped the merge.
    Aborted,
}

impl MergePhase {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    #[must_use]
    pub const fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Diffing => &[Self::Ordering],
            Self::Ordering => &[Self::Replacing],
            Self::Replacing => &[Self::Finalizing, Self::Aborted],
            Self::Finalizing => &[Self::Done],
            Self::Done | Self::Aborted => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(&self, next: &Self) -> bool {
        self.valid_transitions().contains(next)
    }
}

impl fmt::Display for MergePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diffing => write!(f, "diffing"),
            Self::Ordering => write!(f, "ordering"),
            Self::Replacing => write!(f, "replacing"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Done => write!(f, "done"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Counts reported at the end of a run, whether it completed or not.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Differing records found in each source, in source order.
    pub differing_per_source: Vec<usize>,
    pub differing_total: usize,
    /// Records written into the target block.
    pub replaced: usize,
    /// Set when an atomic run aborted and its staged writes were discarded.
    pub rolled_back: bool,
}

/// Details of the collision that aborted a merge.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionReport {
    /// Target slot the candidate was headed for.
    pub destination: usize,
    /// Occupied target slot the candidate came too close to.
    pub target_slot: usize,
    pub distance: f32,
    pub candidate: Candidate,
    /// The record in `target_slot` at the time of the check.
    pub occupant: CarGenerator,
}

impl fmt::Display for CollisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.candidate.record;
        let o = &self.occupant;
        write!(
            f,
            "collision found: slot = {}; location = <{:.3}, {:.3}, {:.3}>; distance = {:.3} \
             (candidate model {} from source {} slot {} at <{:.3}, {:.3}, {:.3}>, \
             occupant model {}, destination slot {})",
            self.target_slot,
            o.position.x,
            o.position.y,
            o.position.z,
            self.distance,
            c.model,
            self.candidate.source,
            self.candidate.slot,
            c.position.x,
            c.position.y,
            c.position.z,
            o.model,
            self.destination,
        )
    }
}

/// How a merge run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum MergeOutcome {
    Completed(MergeSummary),
    Aborted {
        summary: MergeSummary,
        collision: Box<CollisionReport>,
    },
}

impl MergeOutcome {
    #[must_use]
    pub const fn summary(&self) -> &MergeSummary {
        match self {
            Self::Completed(summary) | Self::Aborted { summary, .. } => summary,
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
