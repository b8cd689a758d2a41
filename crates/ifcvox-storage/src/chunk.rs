//! Chunk availability table built from `<base>.index`.

/// Storage kind of a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// No occupied voxels.
    Empty,
    /// Bit-packed payload starting at `offset` in the contents blob.
    Explicit {
        /// Byte offset into the contents blob.
        offset: usize,
    },
    /// Described by the primitive at `index`.
    Implicit {
        /// Index into the primitive list.
        index: usize,
    },
}

const INDEX_EMPTY: u8 = 0;
const INDEX_EXPLICIT: u8 = 1;
const INDEX_IMPLICIT: u8 = 2;

/// One [`ChunkKind`] per chunk coordinate of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    dims: [usize; 3],
    entries: Vec<ChunkKind>,
    explicit: usize,
    implicit: usize,
}

impl Availability {
    /// Builds the table from index bytes in i-slowest, then j, then k order.
    ///
    /// Explicit chunks are assigned consecutive payloads of `payload_len`
    /// bytes; implicit chunks consecutive primitive indices.
    pub fn from_index(
        index: &[u8],
        dims: [usize; 3],
        payload_len: usize,
    ) -> Result<Self, String> {
        let count = dims[0] * dims[1] * dims[2];
        if index.len() < count {
            return Err(format!(
                "index holds {} entries, grid has {count} chunks",
                index.len()
            ));
        }
        if index.len() > count {
            tracing::warn!(
                extra = index.len() - count,
                "ignoring trailing bytes in chunk index"
            );
        }

        let mut entries = Vec::with_capacity(count);
        let mut loc = 0;
        let mut explicit = 0;
        let mut prim = 0;
        for (n, &byte) in index[..count].iter().enumerate() {
            let kind = match byte {
                INDEX_EMPTY => ChunkKind::Empty,
                INDEX_EXPLICIT => {
                    let kind = ChunkKind::Explicit { offset: loc };
                    loc += payload_len;
                    explicit += 1;
                    kind
                }
                INDEX_IMPLICIT => {
                    let kind = ChunkKind::Implicit { index: prim };
                    prim += 1;
                    kind
                }
                other => return Err(format!("invalid index value {other} at chunk {n}")),
            };
            entries.push(kind);
        }

        Ok(Self {
            dims,
            entries,
            explicit,
            implicit: prim,
        })
    }

    /// Chunk-grid dimensions.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Looks up a chunk. Coordinates outside the grid yield `None`.
    pub fn get(&self, ijk: [usize; 3]) -> Option<ChunkKind> {
        let [nx, ny, nz] = self.dims;
        let [i, j, k] = ijk;
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        self.entries.get((i * ny + j) * nz + k).copied()
    }

    /// Number of explicit chunks.
    pub fn explicit_count(&self) -> usize {
        self.explicit
    }

    /// Number of implicit chunks.
    pub fn implicit_count(&self) -> usize {
        self.implicit
    }

    /// Number of chunks in the grid.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
