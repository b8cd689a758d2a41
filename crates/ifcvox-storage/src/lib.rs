//! Sparse chunked voxel storage written by the voxelization toolkit, with
//! axis-aligned slicing and multi-grid harmonization.
//!
//! A grid on disk is a set of sibling files sharing one base path:
//! `<base>.meta`, `<base>.index`, `<base>.contents` and `<base>.primitives`.
//! [`VoxelGrid::load`] picks the store variant from the metadata header.

pub mod bit_plane;
pub mod chunk;
pub mod chunked;
pub mod continuous;
pub mod error;
mod files;
pub mod grid;
pub mod harmonize;
pub mod meta;
pub mod plane;
pub mod primitive;

pub use chunk::{Availability, ChunkKind};
pub use chunked::{ChunkedMeta, ChunkedStore, GridFrame};
pub use continuous::ContinuousStore;
pub use error::{ErrorKind, StorageError};
pub use grid::VoxelGrid;
pub use harmonize::harmonize;
pub use meta::{Encoding, GridMeta};
pub use plane::{Plane, free_axes};
pub use primitive::{Primitive, Term};

/// Result alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;
