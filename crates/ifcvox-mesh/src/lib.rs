//! Annotation geometry: parsing polygon/line soups, packing them into the
//! binary mesh buffer consumed by the viewer, and mapping objects to building
//! storeys.

pub mod buffer;
pub mod color;
pub mod error;
pub mod inputs;
pub mod normals;
pub mod obj;
pub mod storey;

pub use buffer::{BufferHeader, MeshBuffer, MeshObject, ObjectRecord};
pub use color::Rgba;
pub use error::MeshError;
pub use inputs::{InputFile, parse_encode_args};
pub use normals::{quad_normals, quantize_normal};
pub use obj::{GroupMarker, PolygonSoup};
pub use storey::{
    Storey, StoreyAssignment, assign_storeys, load_storeys, object_elevations, write_sidecar,
};

/// Result alias used throughout the mesh crate.
pub type Result<T> = std::result::Result<T, MeshError>;
