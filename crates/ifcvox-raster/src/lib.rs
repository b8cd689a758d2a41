//! Turns occupancy planes into images: single grey slices and colored
//! composites of several harmonized grids.

mod color;
mod composite;
mod error;
mod image;

pub use color::LayerColor;
pub use composite::{CompositeBuilder, render_slice};
pub use error::RasterError;
pub use image::{Image, PixelFormat};

pub type Result<T> = std::result::Result<T, RasterError>;
