//! Parsing of the `<base>.meta` descriptor that selects a grid encoding.
//!
//! ## Layout
//!
//! | Encoding | Header | Following lines |
//! |----------|--------|-----------------|
//! | continuous | `CONT` / `continuous` | three integer lines: shape in voxels |
//! | chunked-legacy | `CHUNK` / `chunked-legacy` | chunk size, then three integer lines: chunk counts |
//! | chunked-current | `CHUNK2` / `chunked-current` | voxel size, chunk size, `ox;oy;oz`, `nx;ny;nz` |

use std::path::Path;
use std::str::FromStr;

use crate::files::{read_required, with_suffix};
use crate::{Result, StorageError};

/// The storage encoding named by the metadata header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// A single dense bit-packed cuboid.
    Continuous,
    /// Chunked storage without origin or voxel size.
    ChunkedLegacy,
    /// Chunked storage with voxel size and a real-world origin.
    ChunkedCurrent,
}

impl Encoding {
    /// Parses a header tag. Both the descriptive names and the short tags
    /// emitted by the voxelization toolkit are accepted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "continuous" | "CONT" => Some(Self::Continuous),
            "chunked-legacy" | "CHUNK" => Some(Self::ChunkedLegacy),
            "chunked-current" | "CHUNK2" => Some(Self::ChunkedCurrent),
            _ => None,
        }
    }

    /// The descriptive tag for this encoding.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::ChunkedLegacy => "chunked-legacy",
            Self::ChunkedCurrent => "chunked-current",
        }
    }
}

/// Immutable grid metadata as read from `<base>.meta`.
#[derive(Debug, Clone, PartialEq)]
pub enum GridMeta {
    /// Dense cuboid of `shape` voxels.
    Continuous {
        /// Extent in voxels along x, y and z.
        shape: [usize; 3],
    },
    /// Chunked grid without spatial placement.
    ChunkedLegacy {
        /// Chunk edge length in voxels.
        chunk_size: usize,
        /// Number of chunks along each axis.
        num_chunks: [usize; 3],
    },
    /// Chunked grid placed in world space.
    ChunkedCurrent {
        /// Voxel edge length in world units.
        voxel_size: f64,
        /// Chunk edge length in voxels.
        chunk_size: usize,
        /// World-space position of the grid's minimum corner.
        origin: [f64; 3],
        /// Number of chunks along each axis.
        num_chunks: [usize; 3],
    },
}

impl GridMeta {
    /// Reads and parses `<base>.meta`.
    pub fn read(base: &Path) -> Result<Self> {
        let path = with_suffix(base, ".meta");
        let bytes = read_required(&path)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| StorageError::format(&path, "metadata is not valid UTF-8"))?;
        Self::parse(&text).map_err(|reason| StorageError::format(&path, reason))
    }

    /// Parses metadata text. The error string describes the first defect found.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines.next().ok_or("empty metadata")?;
        let encoding =
            Encoding::from_tag(header).ok_or_else(|| format!("unrecognized header {header:?}"))?;

        let meta = match encoding {
            Encoding::Continuous => {
                let shape = [
                    parse_scalar(lines.next(), "shape x")?,
                    parse_scalar(lines.next(), "shape y")?,
                    parse_scalar(lines.next(), "shape z")?,
                ];
                Self::Continuous { shape }
            }
            Encoding::ChunkedLegacy => {
                let chunk_size = parse_chunk_size(lines.next())?;
                let num_chunks = [
                    parse_scalar(lines.next(), "chunk count x")?,
                    parse_scalar(lines.next(), "chunk count y")?,
                    parse_scalar(lines.next(), "chunk count z")?,
                ];
                Self::ChunkedLegacy {
                    chunk_size,
                    num_chunks,
                }
            }
            Encoding::ChunkedCurrent => {
                let voxel_size: f64 = parse_scalar(lines.next(), "voxel size")?;
                if !(voxel_size.is_finite() && voxel_size > 0.0) {
                    return Err(format!("voxel size must be positive, got {voxel_size}"));
                }
                let chunk_size = parse_chunk_size(lines.next())?;
                let origin = parse_triple(lines.next(), "origin")?;
                let num_chunks = parse_triple(lines.next(), "chunk counts")?;
                Self::ChunkedCurrent {
                    voxel_size,
                    chunk_size,
                    origin,
                    num_chunks,
                }
            }
        };

        if let Some(extra) = lines.next() {
            return Err(format!("unexpected trailing line {extra:?}"));
        }
        Ok(meta)
    }

    /// The encoding this metadata describes.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Continuous { .. } => Encoding::Continuous,
            Self::ChunkedLegacy { .. } => Encoding::ChunkedLegacy,
            Self::ChunkedCurrent { .. } => Encoding::ChunkedCurrent,
        }
    }

    /// Chunk edge length, if the encoding is chunked.
    pub fn chunk_size(&self) -> Option<usize> {
        match self {
            Self::Continuous { .. } => None,
            Self::ChunkedLegacy { chunk_size, .. } | Self::ChunkedCurrent { chunk_size, .. } => {
                Some(*chunk_size)
            }
        }
    }
}

fn parse_scalar<T: FromStr>(line: Option<&str>, what: &str) -> std::result::Result<T, String> {
    let line = line.ok_or_else(|| format!("missing {what}"))?;
    line.parse()
        .map_err(|_| format!("invalid {what}: {line:?}"))
}

fn parse_triple<T: FromStr + Copy + Default>(
    line: Option<&str>,
    what: &str,
) -> std::result::Result<[T; 3], String> {
    let line = line.ok_or_else(|| format!("missing {what}"))?;
    let parts: Vec<&str> = line.split(';').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("{what} needs 3 `;`-separated values, got {line:?}"));
    }
    let mut out = [T::default(); 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("invalid {what} component {part:?}"))?;
    }
    Ok(out)
}

fn parse_chunk_size(line: Option<&str>) -> std::result::Result<usize, String> {
    let cs: usize = parse_scalar(line, "chunk size")?;
    if cs == 0 || cs % 8 != 0 {
        return Err(format!("chunk size must be a positive multiple of 8, got {cs}"));
    }
    Ok(cs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chunked_current() {
        let meta = GridMeta::parse("CHUNK2\n0.05\n16\n-1.5;0;2.25\n4;3;2\n").unwrap();
        assert_eq!(
            meta,
            GridMeta::ChunkedCurrent {
                voxel_size: 0.05,
                chunk_size: 16,
                origin: [-1.5, 0.0, 2.25],
                num_chunks: [4, 3, 2],
            }
        );
        assert_eq!(meta.encoding(), Encoding::ChunkedCurrent);
        assert_eq!(meta.chunk_size(), Some(16));
    }

    #[test]
    fn test_parse_legacy_and_continuous() {
        let meta = GridMeta::parse("chunked-legacy\n8\n1\n2\n3").unwrap();
        assert_eq!(
            meta,
            GridMeta::ChunkedLegacy {
                chunk_size: 8,
                num_chunks: [1, 2, 3],
            }
        );

        let meta = GridMeta::parse("CONT\n10\n20\n30\n").unwrap();
        assert_eq!(meta, GridMeta::Continuous { shape: [10, 20, 30] });
        assert_eq!(meta.chunk_size(), None);
    }

    #[test]
    fn test_unknown_header_rejected() {
        let err = GridMeta::parse("CHUNK3\n8\n1\n1\n1").unwrap_err();
        assert!(err.contains("CHUNK3"), "{err}");
    }

    #[test]
    fn test_bad_chunk_size_rejected() {
        assert!(GridMeta::parse("CHUNK\n12\n1\n1\n1").is_err());
        assert!(GridMeta::parse("CHUNK\n0\n1\n1\n1").is_err());
    }

    #[test]
    fn test_truncated_and_malformed_lines() {
        assert!(GridMeta::parse("CHUNK2\n0.1\n8\n0;0;0\n").is_err());
        assert!(GridMeta::parse("CHUNK2\n0.1\n8\n0;0\n1;1;1").is_err());
        assert!(GridMeta::parse("CHUNK2\nabc\n8\n0;0;0\n1;1;1").is_err());
        assert!(GridMeta::parse("").is_err());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = GridMeta::read(&dir.path().join("0.vox")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }), "{err:?}");
    }

    #[test]
    fn test_read_bad_header_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0.vox.meta"), "VOXELS\n").unwrap();
        let err = GridMeta::read(&dir.path().join("0.vox")).unwrap_err();
        assert!(matches!(err, StorageError::Format { .. }), "{err:?}");
    }
}
