//! Top-level error type for the car-generator tools.
//!
//! [`ToolError`] wraps every failure a command can end with. Each variant maps
//! to a process [`ExitStatus`], so scripts can tell a collision apart from a
//! broken savedata file.

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

use crate::config::ConfigError;
use crate::dataset::DatasetError;
use crate::merge::CollisionReport;
use crate::merge::priority::PriorityError;

// ---------------------------------------------------------------------------
// ExitStatus
// ---------------------------------------------------------------------------

/// Process exit codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    /// The command ran but could not finish (e.g. a merge collision).
    Error = 1,
    BadCommandLine = 2,
    BadIo = 3,
    BadSaveData = 4,
    BadJson = 5,
    Unknown = 255,
}

impl ExitStatus {
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

// ---------------------------------------------------------------------------
// ToolError
// ---------------------------------------------------------------------------

/// Error from running one tool command.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Priority(#[from] PriorityError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An interchange file could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An interchange file is not a valid car-generator document.
    #[error("{}: invalid car generator document: {source}", path.display())]
    BadJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An interchange document parsed but does not fit the active save format.
    #[error("{}: invalid car generator document: {detail}", path.display())]
    InvalidDocument { path: PathBuf, detail: String },

    /// The merge stopped on a collision; nothing was written.
    #[error("{0}")]
    Collision(Box<CollisionReport>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Dataset(DatasetError::Io { .. }) | Self::Priority(_) | Self::Io { .. } => {
                ExitStatus::BadIo
            }
            Self::Dataset(DatasetError::Invalid { .. }) => ExitStatus::BadSaveData,
            Self::BadJson { .. } | Self::InvalidDocument { .. } => ExitStatus::BadJson,
            Self::Config(_) => ExitStatus::BadCommandLine,
            Self::Collision(_) => ExitStatus::Error,
            Self::Other(_) => ExitStatus::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
