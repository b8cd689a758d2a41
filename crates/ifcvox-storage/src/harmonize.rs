//! Aligning independently produced chunked grids onto one logical frame.
//!
//! Each grid's world origin is converted to chunk units. The shared frame
//! spans from the component-wise minimum origin to the component-wise maximum
//! of origin plus chunk count. A member's offset is `min - own_origin`, so a
//! chunk at own coordinate `c` lands at logical coordinate `c - offset`.

use crate::chunked::GridFrame;
use crate::grid::VoxelGrid;
use crate::{Result, StorageError};

const VOXEL_SIZE_TOLERANCE: f64 = 1e-9;

/// Largest chunk-unit origin magnitude accepted from metadata.
const MAX_CHUNK_ORIGIN: f64 = (1u64 << 40) as f64;

/// Harmonizes every grid in `grids` and returns the shared chunk counts.
///
/// All members must be chunked grids with an origin and voxel size, and must
/// agree on chunk size and voxel size. On error no member is modified.
pub fn harmonize(grids: &mut [VoxelGrid]) -> Result<[usize; 3]> {
    let mut placements = Vec::with_capacity(grids.len());
    let mut reference: Option<(usize, f64)> = None;

    for grid in grids.iter() {
        let meta = grid.chunked_meta().ok_or_else(|| {
            StorageError::Precondition("continuous grids cannot be harmonized".into())
        })?;
        let (origin, voxel_size) = match (meta.origin(), meta.voxel_size()) {
            (Some(origin), Some(voxel_size)) => (origin, voxel_size),
            _ => {
                return Err(StorageError::Precondition(format!(
                    "grid {} has no origin or voxel size",
                    meta.base().display()
                )));
            }
        };

        let cs = meta.chunk_size();
        match reference {
            None => reference = Some((cs, voxel_size)),
            Some((ref_cs, ref_vs)) => {
                if cs != ref_cs {
                    return Err(StorageError::Precondition(format!(
                        "chunk size mismatch: {cs} vs {ref_cs}"
                    )));
                }
                if (voxel_size - ref_vs).abs() > VOXEL_SIZE_TOLERANCE * ref_vs.abs() {
                    return Err(StorageError::Precondition(format!(
                        "voxel size mismatch: {voxel_size} vs {ref_vs}"
                    )));
                }
            }
        }

        let extent = cs as f64 * voxel_size;
        let chunk_origin = origin.map(|o| (o / extent).round());
        if chunk_origin
            .iter()
            .any(|c| !c.is_finite() || c.abs() > MAX_CHUNK_ORIGIN)
        {
            return Err(StorageError::Precondition(format!(
                "grid {} has an unusable origin {origin:?}",
                meta.base().display()
            )));
        }
        placements.push((chunk_origin.map(|c| c as i64), meta.own_numchunks()));
    }

    let Some(&(first_origin, _)) = placements.first() else {
        return Ok([0; 3]);
    };
    let mut min = first_origin;
    let mut max = [i64::MIN; 3];
    for (origin, numchunks) in &placements {
        for axis in 0..3 {
            min[axis] = min[axis].min(origin[axis]);
            let end = i64::try_from(numchunks[axis])
                .ok()
                .and_then(|n| origin[axis].checked_add(n))
                .ok_or_else(|| {
                    StorageError::Precondition(format!(
                        "chunk count {} overflows the shared frame",
                        numchunks[axis]
                    ))
                })?;
            max[axis] = max[axis].max(end);
        }
    }
    let numchunks = [0, 1, 2].map(|axis| (max[axis] - min[axis]) as usize);

    for (grid, (origin, _)) in grids.iter_mut().zip(&placements) {
        let frame = GridFrame {
            offset: [0, 1, 2].map(|axis| min[axis] - origin[axis]),
            numchunks,
        };
        if let Some(meta) = grid.chunked_meta_mut() {
            meta.set_frame(frame);
        }
    }

    tracing::debug!(members = grids.len(), ?min, ?max, ?numchunks, "harmonized voxel grids");
    Ok(numchunks)
}
