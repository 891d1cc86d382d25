//! Priority maps: which target slots receive replacements, and in what order.
//!
//! A [`PriorityMap`] maps a priority rank to the target slot indices sharing
//! that rank. Rank 0 is replaced first. Negative ranks exclude their slots
//! from replacement entirely.
//!
//! Maps come from one of two places:
//!
//! - a user-supplied priority list, one `priority,index` pair per line
//!   ([`PriorityMap::load`]);
//! - a random full permutation of the block ([`PriorityMap::generate`]), so a
//!   run without a list replaces slots in random order with no ties.
//!
//! # Priority list format
//!
//! ```text
//! # priority,index
//! 0,12
//! 0,13
//! 1,40
//! # never touch slot 0
//! -1,0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

// ---------------------------------------------------------------------------
// List reader
// ---------------------------------------------------------------------------

/// A non-comment line of a priority list, split into fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListLine {
    /// 1-based line number in the source file.
    pub line: usize,
    pub fields: Vec<String>,
}

/// Split priority-list text into comma-separated records.
///
/// Blank lines and lines starting with `#` are skipped. Fields are trimmed
/// and one pair of enclosing double quotes is removed.
#[must_use]
pub fn parse_list_lines(text: &str) -> Vec<ListLine> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            let fields = trimmed.split(',').map(unquote).collect();
            Some(ListLine {
                line: i + 1,
                fields,
            })
        })
        .collect()
}

fn unquote(field: &str) -> String {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
        .to_owned()
}

/// Read and split a priority list file.
///
/// # Errors
/// Propagates the I/O error if the file cannot be read.
pub fn read_priority_list(path: &Path) -> std::io::Result<Vec<ListLine>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_list_lines(&text))
}

// ---------------------------------------------------------------------------
// Warnings and errors
// ---------------------------------------------------------------------------

/// A priority-list line that was skipped. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PriorityWarning {
    #[error("{file}:{line}: line is malformed")]
    Malformed { file: String, line: usize },

    #[error("{file}:{line}: index exceeds maximum value of {max}")]
    IndexOutOfRange {
        file: String,
        line: usize,
        max: usize,
    },
}

/// The priority list could not be read.
#[derive(Debug, Error)]
#[error("could not read priority list {}: {source}", path.display())]
pub struct PriorityError {
    pub path: std::path::PathBuf,
    #[source]
    pub source: std::io::Error,
}

// ---------------------------------------------------------------------------
// PriorityMap
// ---------------------------------------------------------------------------

/// Priority rank → target slot indices.
///
/// Backed by a `BTreeMap` so iteration is already in ascending rank order.
/// Indices are kept in insertion order and are not de-duplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriorityMap {
    ranks: BTreeMap<i32, Vec<usize>>,
}

impl PriorityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `index` to the set at `priority`.
    pub fn insert(&mut self, priority: i32, index: usize) {
        self.ranks.entry(priority).or_default().push(index);
    }

    /// Indices registered at `priority`, if any.
    #[must_use]
    pub fn get(&self, priority: i32) -> Option<&[usize]> {
        self.ranks.get(&priority).map(Vec::as_slice)
    }

    /// Iterate `(priority, indices)` in ascending priority.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[usize])> {
        self.ranks.iter().map(|(p, v)| (*p, v.as_slice()))
    }

    /// Total number of `(priority, index)` entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.ranks.values().map(Vec::len).sum()
    }

    /// Build a map from priority-list lines.
    ///
    /// Lines with fewer than two fields, a non-integer field, or a negative
    /// index are malformed. Lines with `index >= capacity` are out of range.
    /// Both are skipped, logged at `warn`, and returned alongside the map.
    #[must_use]
    pub fn from_lines(
        lines: &[ListLine],
        capacity: usize,
        file: &str,
    ) -> (Self, Vec<PriorityWarning>) {
        let mut map = Self::new();
        let mut warnings = Vec::new();

        for entry in lines {
            let parsed = match entry.fields.as_slice() {
                [priority, index, ..] => priority
                    .parse::<i32>()
                    .ok()
                    .zip(index.parse::<i32>().ok())
                    .filter(|(_, index)| *index >= 0),
                _ => None,
            };

            let Some((priority, index)) = parsed else {
                let w = PriorityWarning::Malformed {
                    file: file.to_owned(),
                    line: entry.line,
                };
                tracing::warn!("{w}");
                warnings.push(w);
                continue;
            };

            let index = match usize::try_from(index) {
                Ok(i) if i < capacity => i,
                _ => {
                    let w = PriorityWarning::IndexOutOfRange {
                        file: file.to_owned(),
                        line: entry.line,
                        max: capacity.saturating_sub(1),
                    };
                    tracing::warn!("{w}");
                    warnings.push(w);
                    continue;
                }
            };

            map.insert(priority, index);
        }

        (map, warnings)
    }

    /// Read a priority list file and build the map.
    ///
    /// # Errors
    /// Returns [`PriorityError`] if the file cannot be read. Malformed lines
    /// are warnings, not errors.
    pub fn load(
        path: &Path,
        capacity: usize,
    ) -> Result<(Self, Vec<PriorityWarning>), PriorityError> {
        tracing::debug!(path = %path.display(), "reading priority list");
        let lines = read_priority_list(path).map_err(|source| PriorityError {
            path: path.to_owned(),
            source,
        })?;
        let label = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::from_lines(&lines, capacity, &label))
    }

    /// Assign every slot `0..capacity` its own rank, in random order.
    pub fn generate<R: Rng + ?Sized>(capacity: usize, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..capacity).collect();
        indices.shuffle(rng);

        let mut map = Self::new();
        for (rank, index) in (0_i32..).zip(indices) {
            map.insert(rank, index);
        }
        map
    }
}

impl FromIterator<(i32, usize)> for PriorityMap {
    fn from_iter<I: IntoIterator<Item = (i32, usize)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (priority, index) in iter {
            map.insert(priority, index);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
