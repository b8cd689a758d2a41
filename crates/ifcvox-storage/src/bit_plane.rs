//! Bit-packed occupancy cuboids.
//!
//! Packed data stores eight z-consecutive voxels per byte. Bytes are laid out
//! x-fastest, then y, then z-byte; within a byte, bit `z % 8` holds voxel `z`.
//! Dense (unpacked) cuboids hold one `0`/`1` byte per voxel at
//! `x + sx * (y + sy * z)`.

/// Number of z-bytes needed for `sz` voxels.
pub fn z_bytes(sz: usize) -> usize {
    sz.div_ceil(8)
}

/// Number of packed bytes for one chunk of edge length `chunk_size`.
pub fn chunk_payload_len(chunk_size: usize) -> usize {
    chunk_size * chunk_size * chunk_size / 8
}

#[inline]
fn packed_index(shape: [usize; 3], x: usize, y: usize, zb: usize) -> usize {
    x + shape[0] * (y + shape[1] * zb)
}

/// Returns the packed length of a cuboid of `shape` voxels.
pub fn packed_len(shape: [usize; 3]) -> usize {
    shape[0] * shape[1] * z_bytes(shape[2])
}

/// Unpacks a bit-packed cuboid into one byte per voxel.
///
/// `packed` must hold at least [`packed_len`] bytes.
pub fn unpack(packed: &[u8], shape: [usize; 3]) -> Vec<u8> {
    let [sx, sy, sz] = shape;
    debug_assert!(packed.len() >= packed_len(shape), "packed cuboid too short");
    let mut dense = vec![0u8; sx * sy * sz];
    for zb in 0..z_bytes(sz) {
        for y in 0..sy {
            for x in 0..sx {
                let byte = packed[packed_index(shape, x, y, zb)];
                if byte == 0 {
                    continue;
                }
                // The last z-byte may be partially used.
                for bit in 0..8.min(sz - zb * 8) {
                    let z = zb * 8 + bit;
                    dense[x + sx * (y + sy * z)] = (byte >> bit) & 1;
                }
            }
        }
    }
    dense
}

/// Packs a dense cuboid (one byte per voxel, non-zero = occupied).
pub fn pack(dense: &[u8], shape: [usize; 3]) -> Vec<u8> {
    let [sx, sy, sz] = shape;
    debug_assert_eq!(dense.len(), sx * sy * sz);
    let mut packed = vec![0u8; packed_len(shape)];
    for z in 0..sz {
        for y in 0..sy {
            for x in 0..sx {
                if dense[x + sx * (y + sy * z)] != 0 {
                    packed[packed_index(shape, x, y, z / 8)] |= 1 << (z % 8);
                }
            }
        }
    }
    packed
}

/// Reads a single voxel straight from packed data.
pub fn packed_bit(packed: &[u8], shape: [usize; 3], x: usize, y: usize, z: usize) -> bool {
    (packed[packed_index(shape, x, y, z / 8)] >> (z % 8)) & 1 != 0
}

/// Extracts one axis-aligned plane of a packed chunk without unpacking the
/// rest of it.
///
/// The result is `chunk_size²` bytes indexed `u * chunk_size + v`, where `u`
/// and `v` run over the two remaining axes in ascending order. Along the
/// packed z axis this masks a single bit of each byte; along x or y it
/// expands all eight bit-planes of the touched bytes.
pub fn chunk_plane(payload: &[u8], chunk_size: usize, axis: usize, sub: usize) -> Vec<u8> {
    let cs = chunk_size;
    let shape = [cs, cs, cs];
    let mut tile = vec![0u8; cs * cs];
    match axis {
        2 => {
            let (zb, bit) = (sub / 8, sub % 8);
            for x in 0..cs {
                for y in 0..cs {
                    tile[x * cs + y] = (payload[packed_index(shape, x, y, zb)] >> bit) & 1;
                }
            }
        }
        _ => {
            for w in 0..cs {
                for zb in 0..z_bytes(cs) {
                    let (x, y) = if axis == 0 { (sub, w) } else { (w, sub) };
                    let byte = payload[packed_index(shape, x, y, zb)];
                    for bit in 0..8 {
                        tile[w * cs + zb * 8 + bit] = (byte >> bit) & 1;
                    }
                }
            }
        }
    }
    tile
}
