//! Sparse chunked voxel store.
//!
//! The grid is divided into cubic chunks of `chunk_size` voxels. Every chunk
//! is empty, explicit (a bit-packed payload in `<base>.contents`) or implicit
//! (a [`Primitive`] line in `<base>.primitives`).

use std::path::{Path, PathBuf};

use crate::bit_plane::{chunk_payload_len, chunk_plane};
use crate::chunk::{Availability, ChunkKind};
use crate::files::{read_optional, read_required, with_suffix};
use crate::plane::{Plane, free_axes};
use crate::primitive::Primitive;
use crate::{Result, StorageError};

/// Placement of a grid inside a shared logical frame.
///
/// A freshly loaded grid has a zero offset and its own chunk counts.
/// [`crate::harmonize`] rewrites both so that several grids line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFrame {
    /// Own chunk coordinate minus logical chunk coordinate, per axis.
    pub offset: [i64; 3],
    /// Logical chunk counts of the shared frame.
    pub numchunks: [usize; 3],
}

/// Descriptor of a chunked grid, independent of its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedMeta {
    base: PathBuf,
    chunk_size: usize,
    own_numchunks: [usize; 3],
    origin: Option<[f64; 3]>,
    voxel_size: Option<f64>,
    frame: GridFrame,
}

impl ChunkedMeta {
    /// Creates a descriptor. `origin` and `voxel_size` are only known for the
    /// current chunked encoding.
    pub fn new(
        base: impl Into<PathBuf>,
        chunk_size: usize,
        numchunks: [usize; 3],
        origin: Option<[f64; 3]>,
        voxel_size: Option<f64>,
    ) -> Self {
        Self {
            base: base.into(),
            chunk_size,
            own_numchunks: numchunks,
            origin,
            voxel_size,
            frame: GridFrame {
                offset: [0; 3],
                numchunks,
            },
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunk counts of the grid's own data.
    pub fn own_numchunks(&self) -> [usize; 3] {
        self.own_numchunks
    }

    /// Chunk counts of the logical frame (equal to the own counts until harmonized).
    pub fn numchunks(&self) -> [usize; 3] {
        self.frame.numchunks
    }

    pub fn origin(&self) -> Option<[f64; 3]> {
        self.origin
    }

    pub fn voxel_size(&self) -> Option<f64> {
        self.voxel_size
    }

    pub fn frame(&self) -> GridFrame {
        self.frame
    }

    pub(crate) fn set_frame(&mut self, frame: GridFrame) {
        self.frame = frame;
    }

    /// Logical extent in voxels.
    pub fn shape(&self) -> [usize; 3] {
        self.frame.numchunks.map(|n| n * self.chunk_size)
    }

    /// Extent of the grid's own data in voxels.
    pub fn own_shape(&self) -> [usize; 3] {
        self.own_numchunks.map(|n| n * self.chunk_size)
    }
}

/// A loaded chunked grid, ready for slicing.
#[derive(Debug, Clone)]
pub struct ChunkedStore {
    meta: ChunkedMeta,
    avail: Availability,
    contents: Vec<u8>,
    primitives: Vec<Primitive>,
}

impl ChunkedStore {
    /// Opens the index, contents and primitives files next to `meta.base()`.
    pub fn open(meta: ChunkedMeta) -> Result<Self> {
        let index_path = with_suffix(meta.base(), ".index");
        let index = read_required(&index_path)?;
        let contents = read_optional(&with_suffix(meta.base(), ".contents"))?.unwrap_or_default();
        let primitives_path = with_suffix(meta.base(), ".primitives");
        let primitives = match read_optional(&primitives_path)? {
            Some(bytes) => String::from_utf8(bytes).map_err(|_| {
                StorageError::format(&primitives_path, "primitives are not valid UTF-8")
            })?,
            None => String::new(),
        };
        Self::from_parts(meta, &index, contents, &primitives)
    }

    /// Builds a store from in-memory file contents.
    pub fn from_parts(
        meta: ChunkedMeta,
        index: &[u8],
        contents: Vec<u8>,
        primitives: &str,
    ) -> Result<Self> {
        let cs = meta.chunk_size();
        let payload_len = chunk_payload_len(cs);
        let avail = Availability::from_index(index, meta.own_numchunks(), payload_len)
            .map_err(|reason| StorageError::format(with_suffix(meta.base(), ".index"), reason))?;

        let expected = avail.explicit_count() * payload_len;
        if contents.len() < expected {
            return Err(StorageError::format(
                with_suffix(meta.base(), ".contents"),
                format!(
                    "{} explicit chunks need {expected} bytes, found {}",
                    avail.explicit_count(),
                    contents.len()
                ),
            ));
        }
        if contents.len() > expected {
            tracing::warn!(
                expected,
                actual = contents.len(),
                "contents blob is longer than the explicit chunks require"
            );
        }

        let lines: Vec<&str> = primitives.lines().collect();
        if lines.len() < avail.implicit_count() {
            return Err(StorageError::format(
                with_suffix(meta.base(), ".primitives"),
                format!(
                    "{} implicit chunks but only {} descriptor lines",
                    avail.implicit_count(),
                    lines.len()
                ),
            ));
        }
        let primitives = lines[..avail.implicit_count()]
            .iter()
            .enumerate()
            .map(|(n, line)| {
                Primitive::parse(line.trim(), cs).map_err(|reason| StorageError::Primitive {
                    line: n + 1,
                    reason,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            base = %meta.base().display(),
            chunks = avail.len(),
            explicit = avail.explicit_count(),
            implicit = avail.implicit_count(),
            chunk_size = cs,
            "opened chunked voxel store"
        );

        Ok(Self {
            meta,
            avail,
            contents,
            primitives,
        })
    }

    pub fn meta(&self) -> &ChunkedMeta {
        &self.meta
    }

    pub(crate) fn meta_mut(&mut self) -> &mut ChunkedMeta {
        &mut self.meta
    }

    pub fn availability(&self) -> &Availability {
        &self.avail
    }

    /// The kind of the chunk at own coordinate `ijk`, or `None` outside the grid.
    pub fn chunk(&self, ijk: [usize; 3]) -> Option<ChunkKind> {
        self.avail.get(ijk)
    }

    /// The packed payload of an explicit chunk starting at `offset`.
    pub fn payload(&self, offset: usize) -> Option<&[u8]> {
        self.contents
            .get(offset..offset + chunk_payload_len(self.meta.chunk_size))
    }

    pub fn primitive(&self, index: usize) -> Option<&Primitive> {
        self.primitives.get(index)
    }

    /// Logical extent in voxels.
    pub fn shape(&self) -> [usize; 3] {
        self.meta.shape()
    }

    /// Slices the grid at `offset` along `axis`, in the logical frame.
    ///
    /// The result spans the two remaining logical axes. Chunks whose
    /// translated position falls outside the frame are left out.
    pub fn slice(&self, axis: usize, offset: usize) -> Result<Plane> {
        if axis > 2 {
            return Err(StorageError::InvalidAxis(axis));
        }
        let shape = self.shape();
        if offset >= shape[axis] {
            return Err(StorageError::InvalidSlice {
                axis,
                offset,
                len: shape[axis],
            });
        }

        let cs = self.meta.chunk_size;
        let frame = self.meta.frame;
        let [a0, a1] = free_axes(axis);
        let mut plane = Plane::zeros([shape[a0], shape[a1]]);

        let sub = offset % cs;
        let own_fixed = (offset / cs) as i64 + frame.offset[axis];
        let own = self.meta.own_numchunks;
        if own_fixed < 0 || own_fixed >= own[axis] as i64 {
            return Ok(plane);
        }

        for i in 0..own[a0] {
            for j in 0..own[a1] {
                let mut ijk = [0; 3];
                ijk[axis] = own_fixed as usize;
                ijk[a0] = i;
                ijk[a1] = j;

                let tile = match self.avail.get(ijk) {
                    None | Some(ChunkKind::Empty) => continue,
                    Some(ChunkKind::Explicit { offset }) => match self.payload(offset) {
                        Some(payload) => chunk_plane(payload, cs, axis, sub),
                        None => continue,
                    },
                    Some(ChunkKind::Implicit { index }) => match self.primitives.get(index) {
                        Some(primitive) => primitive.rasterize(axis, sub, cs),
                        None => continue,
                    },
                };

                let du = i as i64 - frame.offset[a0];
                let dv = j as i64 - frame.offset[a1];
                if du < 0 || dv < 0 {
                    continue;
                }
                if !plane.blit(du as usize * cs, dv as usize * cs, cs, &tile) {
                    tracing::warn!(?ijk, "chunk falls outside the logical frame, skipped");
                }
            }
        }

        Ok(plane)
    }
}
