//! Legacy continuous storage: one bit-packed cuboid, unpacked at load time.

use std::path::Path;

use crate::bit_plane::{packed_len, unpack};
use crate::files::read_required;
use crate::plane::{Plane, free_axes};
use crate::{Result, StorageError};

/// A dense occupancy cuboid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuousStore {
    shape: [usize; 3],
    voxels: Vec<u8>,
}

impl ContinuousStore {
    /// Reads the packed cuboid stored at `base` itself.
    pub fn open(base: &Path, shape: [usize; 3]) -> Result<Self> {
        let packed = read_required(base)?;
        Self::from_packed(&packed, shape)
            .map_err(|reason| StorageError::format(base, reason))
    }

    /// Unpacks an in-memory cuboid of `shape` voxels.
    pub fn from_packed(packed: &[u8], shape: [usize; 3]) -> std::result::Result<Self, String> {
        let needed = packed_len(shape);
        if packed.len() < needed {
            return Err(format!(
                "shape {shape:?} needs {needed} packed bytes, found {}",
                packed.len()
            ));
        }
        Ok(Self {
            shape,
            voxels: unpack(packed, shape),
        })
    }

    /// Shape of the unpacked array.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Occupancy at `(x, y, z)`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        let [sx, sy, _] = self.shape;
        self.voxels[x + sx * (y + sy * z)]
    }

    /// Slices at `offset` along `axis`.
    pub fn slice(&self, axis: usize, offset: usize) -> Result<Plane> {
        if axis > 2 {
            return Err(StorageError::InvalidAxis(axis));
        }
        if offset >= self.shape[axis] {
            return Err(StorageError::InvalidSlice {
                axis,
                offset,
                len: self.shape[axis],
            });
        }
        let [a0, a1] = free_axes(axis);
        let dims = [self.shape[a0], self.shape[a1]];
        let mut plane = Plane::zeros(dims);
        for u in 0..dims[0] {
            for v in 0..dims[1] {
                let mut p = [0; 3];
                p[axis] = offset;
                p[a0] = u;
                p[a1] = v;
                plane.set(u, v, self.get(p[0], p[1], p[2]));
            }
        }
        Ok(plane)
    }
}
