use ifcvox_raster::RasterError;
use ifcvox_storage::{ErrorKind, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}: {error}")]
    BindError { addr: String, error: String },
    #[error("server thread panicked")]
    ThreadPanic,
}

/// Why a single request could not be answered.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl RequestError {
    /// HTTP status code for the response.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::BadRequest(_) => 400,
            Self::Unavailable(_) => 503,
            Self::Storage(e) => match e.kind() {
                ErrorKind::NotFound => 404,
                ErrorKind::Precondition => 400,
                ErrorKind::Format | ErrorKind::Io => 500,
            },
            Self::Raster(RasterError::Empty | RasterError::Color(_)) => 400,
            Self::Raster(_) => 500,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => 404,
            Self::Json(_) | Self::Io(_) => 500,
        }
    }
}
