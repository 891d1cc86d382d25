//! `cargen merge`: copy car generators from source saves into a target save.
//!
//! Two phases. [`MergeTool::initialize`] loads every input and fails fast on
//! unreadable or invalid files; [`MergeTool::run`] performs the merge and
//! writes the result. A collision ends the run without touching the output
//! file.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::dataset::{SaveCodec, SaveDataset, unix_now};
use crate::error::ToolError;
use crate::merge::{
    MergeOptions, MergeOutcome, MergeSummary, Merger, PriorityMap, PrioritySource,
    PriorityWarning,
};

/// Everything the merge command was asked to do.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeRequest {
    pub target: PathBuf,
    pub sources: Vec<PathBuf>,
    /// Where to write the merged target. Defaults to `target`.
    pub output: Option<PathBuf>,
    pub priority_list: Option<PathBuf>,
    pub options: MergeOptions,
}

/// A merge with all of its inputs loaded.
pub struct MergeTool<C: SaveCodec> {
    codec: C,
    output: PathBuf,
    target: SaveDataset,
    sources: Vec<(PathBuf, SaveDataset)>,
    priority: PrioritySource,
    warnings: Vec<PriorityWarning>,
    options: MergeOptions,
}

impl<C: SaveCodec> MergeTool<C> {
    /// Load the target, every source, and the priority list if one is given.
    ///
    /// When `options.timestamp` is unset the target is stamped with the
    /// current time.
    ///
    /// # Errors
    /// The first dataset or priority list that cannot be loaded.
    pub fn initialize(request: MergeRequest, codec: C) -> Result<Self, ToolError> {
        let MergeRequest {
            target: target_path,
            sources: source_paths,
            output,
            priority_list,
            mut options,
        } = request;
        let output = output.unwrap_or_else(|| target_path.clone());
        options.timestamp.get_or_insert_with(unix_now);

        tracing::debug!(
            game = %codec.game(),
            target = %target_path.display(),
            sources = source_paths.len(),
            output = %output.display(),
            priority_list = ?priority_list,
            radius = options.radius,
            atomic = options.atomic,
            "launch options"
        );

        let target = codec.load(&target_path)?;
        let sources = source_paths
            .into_iter()
            .map(|path| codec.load(&path).map(|ds| (path, ds)))
            .collect::<Result<Vec<_>, _>>()?;

        let (priority, warnings) = match &priority_list {
            Some(path) => {
                let (map, warnings) = PriorityMap::load(path, target.car_generators.capacity())?;
                (PrioritySource::Provided(map), warnings)
            }
            None => (PrioritySource::Random, Vec::new()),
        };

        Ok(Self {
            codec,
            output,
            target,
            sources,
            priority,
            warnings,
            options,
        })
    }

    /// Non-fatal problems found in the priority list.
    #[must_use]
    pub fn warnings(&self) -> &[PriorityWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Merge and write the target to the output path.
    ///
    /// # Errors
    /// [`ToolError::Collision`] if a candidate lands too close to an occupied
    /// slot (the output file is left untouched), or the write error.
    pub fn run<R: Rng + ?Sized>(self, rng: &mut R) -> Result<MergeSummary, ToolError> {
        let Self {
            codec,
            output,
            mut target,
            sources,
            priority,
            options,
            ..
        } = self;

        let blocks: Vec<_> = sources.iter().map(|(_, ds)| &ds.car_generators).collect();
        let outcome = Merger::new(options, rng).run(&mut target, &blocks, priority);

        for ((path, _), count) in sources.iter().zip(&outcome.summary().differing_per_source) {
            tracing::info!(
                "Found {count} differing car generator{} in {}.",
                plural(*count),
                display_name(path)
            );
        }

        match outcome {
            MergeOutcome::Completed(summary) => {
                tracing::info!(
                    "Merged {} car generator{}.",
                    summary.replaced,
                    plural(summary.replaced)
                );
                codec.save(&target, &output)?;
                Ok(summary)
            }
            MergeOutcome::Aborted { collision, .. } => Err(ToolError::Collision(collision)),
        }
    }
}

/// `"s"` unless `n == 1`.
pub(crate) const fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
