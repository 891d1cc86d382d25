//! The car-generator record.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::FormatRevision;

/// Model id reserved for an unused slot.
pub const EMPTY_MODEL: u32 = 0;

/// Revision-dependent extra fields carried by every record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuxFields {
    /// Percent chance that the spawned car has its alarm armed / doors locked.
    Chances { alarm_chance: u8, locked_chance: u8 },
    /// Paint color ids; `-1` lets the game pick.
    Colors { color1: i16, color2: i16 },
}

impl AuxFields {
    /// The zero value for a revision.
    #[must_use]
    pub const fn empty(revision: FormatRevision) -> Self {
        match revision {
            FormatRevision::Chances => Self::Chances {
                alarm_chance: 0,
                locked_chance: 0,
            },
            FormatRevision::Colors => Self::Colors {
                color1: -1,
                color2: -1,
            },
        }
    }

    /// The revision this field pair belongs to.
    #[must_use]
    pub const fn revision(&self) -> FormatRevision {
        match self {
            Self::Chances { .. } => FormatRevision::Chances,
            Self::Colors { .. } => FormatRevision::Colors,
        }
    }
}

/// A single parked-car spawn point.
///
/// `timer` is per-run runtime state owned by the game; it does not take part
/// in equivalence and is reset whenever the record is written to a slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarGenerator {
    pub model: u32,
    pub position: Vec3,
    pub heading: f32,
    pub enabled: bool,
    pub aux: AuxFields,
    #[serde(default)]
    pub timer: u32,
}

impl CarGenerator {
    /// An unused slot for the given revision.
    #[must_use]
    pub const fn empty(revision: FormatRevision) -> Self {
        Self {
            model: EMPTY_MODEL,
            position: Vec3::ZERO,
            heading: 0.0,
            enabled: false,
            aux: AuxFields::empty(revision),
            timer: 0,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.model == EMPTY_MODEL
    }

    /// Counts toward the block's enabled total.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_empty() && self.enabled
    }

    /// Same record with runtime state cleared, ready to be placed in a slot.
    #[must_use]
    pub fn placed(&self) -> Self {
        Self {
            timer: 0,
            ..self.clone()
        }
    }
}
