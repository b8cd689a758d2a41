//! Mesh encoding error types.

use std::path::PathBuf;

/// Errors that can occur while parsing, encoding or annotating meshes.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// A polygon file line could not be interpreted.
    #[error("{}:{line}: {reason}", file.display())]
    Format {
        /// The polygon file.
        file: PathBuf,
        /// 1-based line number, or 0 for whole-file defects.
        line: usize,
        /// Human-readable description of the defect.
        reason: String,
    },

    /// A color string is not 3, 6 or 8 hex digits.
    #[error("invalid color {0:?}")]
    Color(String),

    /// The encoder was given an unusable argument list.
    #[error("invalid arguments: {0}")]
    Arguments(String),

    /// Storey assignment needs at least one storey.
    #[error("no building storeys available")]
    NoStoreys,

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON sidecar could not be read or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
