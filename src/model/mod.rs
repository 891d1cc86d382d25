//! Record and block model for car generators.
//!
//! - [`types`]: game variants (capacity lookup) and format revisions.
//! - [`record`]: the [`CarGenerator`] record and its revision-specific fields.
//! - [`block`]: the fixed-capacity, index-addressed [`CarGeneratorBlock`].
//! - [`compare`]: record equivalence for diffing and magnitude ordering.

pub mod block;
pub mod compare;
pub mod record;
pub mod types;

pub use block::{BlockError, CarGeneratorBlock};
pub use record::{AuxFields, CarGenerator, EMPTY_MODEL};
pub use types::{FormatRevision, Game};
