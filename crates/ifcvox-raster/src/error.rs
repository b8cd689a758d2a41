#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("no layers were added to the composite")]
    Empty,
    #[error("layer is {got:?} cells, composite is {expected:?}")]
    ShapeMismatch { expected: [usize; 2], got: [usize; 2] },
    #[error("invalid color {0:?}")]
    Color(String),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
