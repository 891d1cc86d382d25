//! Savedata datasets and the codec that loads and stores them.
//!
//! The tool only needs the car-generator block plus the title and timestamp
//! of a save. [`SaveCodec`] is the seam to whatever on-disk format holds them;
//! [`JsonSaveCodec`] stores the dataset as pretty-printed JSON.
//!
//! Every load is validated against the active [`Game`] and [`FormatRevision`]
//! so the rest of the pipeline can assume a full-capacity block with a single
//! aux layout.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CarGeneratorBlock, FormatRevision, Game};

// ---------------------------------------------------------------------------
// SaveDataset
// ---------------------------------------------------------------------------

/// The parts of a savedata file the car-generator tools read and write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveDataset {
    pub game: Game,
    pub revision: FormatRevision,
    /// In-game save title.
    pub name: String,
    /// Seconds since the Unix epoch.
    pub time_last_saved: u64,
    pub car_generators: CarGeneratorBlock,
}

impl SaveDataset {
    /// A fresh dataset with an all-empty block of the game's capacity.
    #[must_use]
    pub fn new(game: Game, revision: FormatRevision, name: impl Into<String>) -> Self {
        Self {
            game,
            revision,
            name: name.into(),
            time_last_saved: 0,
            car_generators: CarGeneratorBlock::new(game.capacity(), revision),
        }
    }
}

/// Current wall-clock time as Unix seconds (0 if the clock is before 1970).
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors loading or storing a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened, read, or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was readable but is not valid data for the active game.
    #[error("{}: not a valid {game} savedata file: {detail}", path.display())]
    Invalid {
        path: PathBuf,
        game: Game,
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// SaveCodec
// ---------------------------------------------------------------------------

/// Loads and stores [`SaveDataset`]s.
pub trait SaveCodec {
    /// The game every loaded dataset must belong to.
    fn game(&self) -> Game;

    /// # Errors
    /// [`DatasetError::Io`] if the file cannot be read, [`DatasetError::Invalid`]
    /// if its content is not a dataset for [`Self::game`].
    fn load(&self, path: &Path) -> Result<SaveDataset, DatasetError>;

    /// # Errors
    /// [`DatasetError::Io`] if the file cannot be written.
    fn save(&self, dataset: &SaveDataset, path: &Path) -> Result<(), DatasetError>;
}

/// JSON-backed savedata codec.
#[derive(Clone, Copy, Debug)]
pub struct JsonSaveCodec {
    game: Game,
    revision: FormatRevision,
}

impl JsonSaveCodec {
    #[must_use]
    pub const fn new(game: Game, revision: FormatRevision) -> Self {
        Self { game, revision }
    }

    fn invalid(&self, path: &Path, detail: impl Into<String>) -> DatasetError {
        DatasetError::Invalid {
            path: path.to_owned(),
            game: self.game,
            detail: detail.into(),
        }
    }

    fn validate(&self, path: &Path, dataset: &SaveDataset) -> Result<(), DatasetError> {
        if dataset.game != self.game {
            return Err(self.invalid(path, format!("file is for {}", dataset.game)));
        }
        if dataset.revision != self.revision {
            return Err(self.invalid(
                path,
                format!(
                    "format revision is '{}', expected '{}'",
                    dataset.revision, self.revision
                ),
            ));
        }
        let capacity = self.game.capacity();
        let block = &dataset.car_generators;
        if block.capacity() != capacity {
            return Err(self.invalid(
                path,
                format!(
                    "car generator block has {} slots, expected {capacity}",
                    block.capacity()
                ),
            ));
        }
        if let Some((index, _)) = block
            .iter()
            .enumerate()
            .find(|(_, cg)| cg.aux.revision() != self.revision)
        {
            return Err(self.invalid(
                path,
                format!("slot {index} does not use the '{}' field layout", self.revision),
            ));
        }
        Ok(())
    }
}

impl SaveCodec for JsonSaveCodec {
    fn game(&self) -> Game {
        self.game
    }

    fn load(&self, path: &Path) -> Result<SaveDataset, DatasetError> {
        tracing::debug!(path = %path.display(), "reading savedata");
        let contents = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_owned(),
            source,
        })?;
        let dataset: SaveDataset =
            serde_json::from_str(&contents).map_err(|e| self.invalid(path, e.to_string()))?;
        self.validate(path, &dataset)?;
        tracing::debug!(
            path = %path.display(),
            game = %dataset.game,
            name = %dataset.name,
            "savedata loaded"
        );
        Ok(dataset)
    }

    fn save(&self, dataset: &SaveDataset, path: &Path) -> Result<(), DatasetError> {
        tracing::debug!(path = %path.display(), "writing savedata");
        let json = serde_json::to_string_pretty(dataset).map_err(|e| DatasetError::Io {
            path: path.to_owned(),
            source: std::io::Error::other(e),
        })?;
        write_atomic(path, json.as_bytes()).map_err(|source| DatasetError::Io {
            path: path.to_owned(),
            source,
        })
    }
}

/// Write via temp file + fsync + rename in the destination directory.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
