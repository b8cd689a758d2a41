//! Error types for loading and slicing voxel grids.

use std::path::PathBuf;

/// Coarse classification of a [`StorageError`], used by callers that map
/// failures onto transport-level statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested grid has no backing files.
    NotFound,
    /// A file exists but its contents are malformed.
    Format,
    /// The caller asked for something the grid cannot provide.
    Precondition,
    /// The operating system refused a read.
    Io,
}

/// Errors that can occur while loading, harmonizing or slicing voxel grids.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required backing file does not exist.
    #[error("no voxel data at {}", path.display())]
    NotFound {
        /// The file that was looked up.
        path: PathBuf,
    },

    /// A metadata, index or contents file is malformed.
    #[error("malformed voxel file {}: {reason}", path.display())]
    Format {
        /// The offending file.
        path: PathBuf,
        /// Human-readable description of the defect.
        reason: String,
    },

    /// An implicit-chunk descriptor line could not be parsed.
    #[error("malformed primitive descriptor on line {line}: {reason}")]
    Primitive {
        /// 1-based line number in the primitives file.
        line: usize,
        /// Human-readable description of the defect.
        reason: String,
    },

    /// Grids were combined or used in a way they do not support.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The slice axis is not 0, 1 or 2.
    #[error("invalid slice axis {0}")]
    InvalidAxis(usize),

    /// The slice offset lies outside the grid's logical extent.
    #[error("slice offset {offset} out of range for axis {axis} (length {len})")]
    InvalidSlice {
        /// Slice axis.
        axis: usize,
        /// Requested offset.
        offset: usize,
        /// Logical length along `axis`.
        len: usize,
    },

    /// Reading a file failed for a reason other than it being absent.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Returns the coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Format { .. } | Self::Primitive { .. } => ErrorKind::Format,
            Self::Precondition(_) | Self::InvalidAxis(_) | Self::InvalidSlice { .. } => {
                ErrorKind::Precondition
            }
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
