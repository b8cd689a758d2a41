//! Loading grids of any encoding behind one closed enum.

use std::path::Path;

use crate::chunked::{ChunkedMeta, ChunkedStore};
use crate::continuous::ContinuousStore;
use crate::meta::GridMeta;
use crate::plane::Plane;
use crate::{Result, StorageError};

/// A voxel grid in one of its storage encodings.
#[derive(Debug, Clone)]
pub enum VoxelGrid {
    /// Legacy dense cuboid.
    Continuous(ContinuousStore),
    /// Chunked grid with its payload loaded.
    Chunked(ChunkedStore),
    /// Chunked grid whose payload was never opened. It takes part in
    /// harmonization but cannot be sliced.
    Lazy(ChunkedMeta),
}

impl VoxelGrid {
    /// Loads the grid whose files share the base path `base`.
    ///
    /// With `lazy` set, a chunked grid with a known origin is returned as
    /// [`VoxelGrid::Lazy`] without reading its index, contents or primitives.
    pub fn load(base: &Path, lazy: bool) -> Result<Self> {
        let meta = GridMeta::read(base)?;
        tracing::debug!(base = %base.display(), encoding = meta.encoding().tag(), lazy, "loading voxel grid");
        let grid = match meta {
            GridMeta::Continuous { shape } => Self::Continuous(ContinuousStore::open(base, shape)?),
            GridMeta::ChunkedLegacy {
                chunk_size,
                num_chunks,
            } => Self::Chunked(ChunkedStore::open(ChunkedMeta::new(
                base, chunk_size, num_chunks, None, None,
            ))?),
            GridMeta::ChunkedCurrent {
                voxel_size,
                chunk_size,
                origin,
                num_chunks,
            } => {
                let meta =
                    ChunkedMeta::new(base, chunk_size, num_chunks, Some(origin), Some(voxel_size));
                if lazy {
                    Self::Lazy(meta)
                } else {
                    Self::Chunked(ChunkedStore::open(meta)?)
                }
            }
        };
        Ok(grid)
    }

    /// Logical extent in voxels.
    pub fn shape(&self) -> [usize; 3] {
        match self {
            Self::Continuous(store) => store.shape(),
            Self::Chunked(store) => store.shape(),
            Self::Lazy(meta) => meta.shape(),
        }
    }

    /// Chunk edge length, for chunked grids.
    pub fn chunk_size(&self) -> Option<usize> {
        self.chunked_meta().map(ChunkedMeta::chunk_size)
    }

    /// Logical chunk counts, for chunked grids.
    pub fn numchunks(&self) -> Option<[usize; 3]> {
        self.chunked_meta().map(ChunkedMeta::numchunks)
    }

    pub fn chunked_meta(&self) -> Option<&ChunkedMeta> {
        match self {
            Self::Continuous(_) => None,
            Self::Chunked(store) => Some(store.meta()),
            Self::Lazy(meta) => Some(meta),
        }
    }

    pub(crate) fn chunked_meta_mut(&mut self) -> Option<&mut ChunkedMeta> {
        match self {
            Self::Continuous(_) => None,
            Self::Chunked(store) => Some(store.meta_mut()),
            Self::Lazy(meta) => Some(meta),
        }
    }

    /// Slices at `offset` along `axis` (0 = x, 1 = y, 2 = z).
    pub fn slice(&self, axis: usize, offset: usize) -> Result<Plane> {
        match self {
            Self::Continuous(store) => store.slice(axis, offset),
            Self::Chunked(store) => store.slice(axis, offset),
            Self::Lazy(meta) => Err(StorageError::Precondition(format!(
                "grid {} was loaded lazily and cannot be sliced",
                meta.base().display()
            ))),
        }
    }

    /// Number of occupied voxels in the slice at `offset` along `axis`.
    pub fn count(&self, axis: usize, offset: usize) -> Result<usize> {
        Ok(self.slice(axis, offset)?.count_occupied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::fs;

    fn write_chunked(dir: &Path, name: &str, meta: &str, index: &[u8], contents: &[u8], prims: &str) {
        let base = dir.join(name);
        fs::write(format!("{}.meta", base.display()), meta).unwrap();
        fs::write(format!("{}.index", base.display()), index).unwrap();
        fs::write(format!("{}.contents", base.display()), contents).unwrap();
        fs::write(format!("{}.primitives", base.display()), prims).unwrap();
    }

    #[test]
    fn test_load_chunked_current() {
        let dir = tempfile::tempdir().unwrap();
        write_chunked(dir.path(), "1.vox", "CHUNK2\n0.1\n8\n0;0;0\n2;1;1\n", &[2, 0], &[], "Y=4\n");
        let grid = VoxelGrid::load(&dir.path().join("1.vox"), false).unwrap();
        assert!(matches!(grid, VoxelGrid::Chunked(_)));
        assert_eq!(grid.shape(), [16, 8, 8]);
        assert_eq!(grid.chunk_size(), Some(8));
        assert_eq!(grid.numchunks(), Some([2, 1, 1]));
        assert_eq!(grid.count(1, 4).unwrap(), 64);
        assert_eq!(grid.count(1, 3).unwrap(), 0);
        // Slicing along z crosses the Y=4 plane in a single row of the first chunk.
        assert_eq!(grid.count(2, 0).unwrap(), 8);
    }

    #[test]
    fn test_load_lazy_skips_payload() {
        let dir = tempfile::tempdir().unwrap();
        // Only the metadata exists.
        fs::write(dir.path().join("2.vox.meta"), "CHUNK2\n0.1\n8\n0.8;0;0\n1;1;1\n").unwrap();
        let grid = VoxelGrid::load(&dir.path().join("2.vox"), true).unwrap();
        assert!(matches!(grid, VoxelGrid::Lazy(_)));
        let err = grid.slice(0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        let err = VoxelGrid::load(&dir.path().join("2.vox"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_load_legacy_without_contents() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("0.vox");
        fs::write(format!("{}.meta", base.display()), "CHUNK\n8\n1\n1\n1\n").unwrap();
        fs::write(format!("{}.index", base.display()), [0u8]).unwrap();
        let grid = VoxelGrid::load(&base, true).unwrap();
        assert!(matches!(grid, VoxelGrid::Chunked(_)));
        assert_eq!(grid.count(2, 7).unwrap(), 0);
    }

    #[test]
    fn test_load_continuous() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("0.vox");
        fs::write(format!("{}.meta", base.display()), "CONT\n2\n1\n8\n").unwrap();
        fs::write(&base, [0xFFu8, 0x00]).unwrap();
        let grid = VoxelGrid::load(&base, false).unwrap();
        assert_eq!(grid.shape(), [2, 1, 8]);
        assert_eq!(grid.chunk_size(), None);
        assert_eq!(grid.count(0, 0).unwrap(), 8);
        assert_eq!(grid.count(0, 1).unwrap(), 0);
    }

    #[test]
    fn test_missing_grid_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = VoxelGrid::load(&dir.path().join("9.vox"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
