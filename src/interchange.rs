//! JSON interchange document for car generators.
//!
//! ```json
//! { "car_generators": [ { "model": 90, "position": [1.0, 2.0, 3.0], ... } ] }
//! ```
//!
//! Only the records travel; block counters are recomputed by whoever imports
//! the document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::write_atomic;
use crate::error::ToolError;
use crate::model::{CarGenerator, CarGeneratorBlock};

/// A list of car-generator records detached from any savedata file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    pub car_generators: Vec<CarGenerator>,
}

impl BlockDocument {
    /// Copy every slot of `block`, empty slots included.
    #[must_use]
    pub fn from_block(block: &CarGeneratorBlock) -> Self {
        Self {
            car_generators: block.as_slice().to_vec(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.car_generators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.car_generators.is_empty()
    }

    /// # Errors
    /// [`ToolError::Io`] if the file cannot be read, [`ToolError::BadJson`] if
    /// it is not a document.
    pub fn read(path: &Path) -> Result<Self, ToolError> {
        tracing::debug!(path = %path.display(), "reading car generator document");
        let contents = std::fs::read_to_string(path).map_err(|source| ToolError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ToolError::BadJson {
            path: path.to_owned(),
            source,
        })
    }

    /// # Errors
    /// [`ToolError::Io`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), ToolError> {
        tracing::debug!(
            path = %path.display(),
            records = self.len(),
            "writing car generator document"
        );
        let json = serde_json::to_string_pretty(self).map_err(|source| ToolError::BadJson {
            path: path.to_owned(),
            source,
        })?;
        write_atomic(path, json.as_bytes()).map_err(|source| ToolError::Io {
            path: path.to_owned(),
            source,
        })
    }
}
