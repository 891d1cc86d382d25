//! `cargen import` / `cargen export`: move car generators between a save and
//! a JSON interchange document.

use std::path::PathBuf;

use crate::dataset::{SaveCodec, unix_now};
use crate::error::ToolError;
use crate::interchange::BlockDocument;
use crate::merge_cmd::plural;
use crate::model::compare::cmp_by_magnitude;
use crate::model::{CarGenerator, CarGeneratorBlock};

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportRequest {
    pub savedata: PathBuf,
    pub json: PathBuf,
    /// Defaults to `savedata`.
    pub output: Option<PathBuf>,
    pub title: Option<String>,
    /// Swap the whole block for the document instead of overlaying it.
    pub replace: bool,
    /// Unix seconds; the current time when unset.
    pub timestamp: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records written into the block.
    pub imported: usize,
    /// Records past the block capacity that were ignored.
    pub truncated: usize,
}

/// Import a document into a save.
///
/// Only the first `capacity` records of the document are used. In overlay
/// mode each non-empty record overwrites the slot with the same index; with
/// `replace` the block becomes the document, padded with empty slots.
///
/// # Errors
/// Load and write failures, or a document whose records use a different aux
/// layout than the save.
pub fn import<C: SaveCodec>(
    request: &ImportRequest,
    codec: &C,
) -> Result<ImportSummary, ToolError> {
    let output = request.output.as_ref().unwrap_or(&request.savedata);
    tracing::debug!(
        savedata = %request.savedata.display(),
        json = %request.json.display(),
        output = %output.display(),
        replace = request.replace,
        "launch options"
    );

    let mut save = codec.load(&request.savedata)?;
    let doc = BlockDocument::read(&request.json)?;
    let capacity = save.car_generators.capacity();

    if let Some(index) = doc
        .car_generators
        .iter()
        .position(|cg| cg.aux.revision() != save.revision)
    {
        return Err(ToolError::InvalidDocument {
            path: request.json.clone(),
            detail: format!("record {index} does not use the '{}' field layout", save.revision),
        });
    }

    let truncated = doc.len().saturating_sub(capacity);
    if truncated > 0 {
        tracing::warn!(
            "car generator limit exceeded; a maximum of {capacity} car generators will be imported"
        );
    }

    let imported = if request.replace {
        let mut slots: Vec<CarGenerator> = doc
            .car_generators
            .iter()
            .take(capacity)
            .map(CarGenerator::placed)
            .collect();
        slots.resize(capacity, CarGenerator::empty(save.revision));
        save.car_generators = CarGeneratorBlock::from_slots(slots);
        tracing::info!("Replaced {capacity} car generator{}.", plural(capacity));
        capacity
    } else {
        let mut count = 0;
        for (slot, cg) in doc.car_generators.iter().enumerate().take(capacity) {
            if cg.is_empty() {
                continue;
            }
            save.car_generators.set(slot, cg).map_err(anyhow::Error::from)?;
            tracing::debug!(
                slot,
                enabled = cg.enabled,
                model = cg.model,
                location = %cg.position,
                "wrote slot"
            );
            count += 1;
        }
        tracing::info!("Imported {count} car generator{}.", plural(count));
        count
    };

    save.car_generators.recompute_counters();
    if let Some(title) = &request.title {
        save.name.clone_from(title);
        tracing::info!("title set to: {}", save.name);
    }
    save.time_last_saved = request.timestamp.unwrap_or_else(unix_now);

    codec.save(&save, output)?;
    Ok(ImportSummary {
        imported,
        truncated,
    })
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportRequest {
    pub savedata: PathBuf,
    /// Defaults to `json`.
    pub output: Option<PathBuf>,
    pub json: PathBuf,
    /// Order records by distance from the world origin, empty slots last.
    pub sort_by_distance: bool,
}

/// Write the block of a save as an interchange document.
///
/// Returns the number of records exported (empty slots included).
///
/// # Errors
/// Load and write failures.
pub fn export<C: SaveCodec>(request: &ExportRequest, codec: &C) -> Result<usize, ToolError> {
    let output = request.output.as_ref().unwrap_or(&request.json);
    tracing::debug!(
        savedata = %request.savedata.display(),
        output = %output.display(),
        sort_by_distance = request.sort_by_distance,
        "launch options"
    );

    let save = codec.load(&request.savedata)?;
    let mut doc = BlockDocument::from_block(&save.car_generators);
    if request.sort_by_distance {
        sort_by_distance(&mut doc.car_generators);
    }

    doc.write(output)?;
    let count = doc.len();
    tracing::info!("Exported {count} car generator{}.", plural(count));
    Ok(count)
}

/// Stable sort: occupied records by position magnitude, then empty slots.
fn sort_by_distance(records: &mut [CarGenerator]) {
    records.sort_by(|a, b| {
        a.is_empty()
            .cmp(&b.is_empty())
            .then_with(|| cmp_by_magnitude(a, b))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
