//! Two-dimensional occupancy results returned by slicing.

/// The two axes that remain after fixing `axis`, in ascending order.
///
/// # Panics
///
/// Panics if `axis > 2`.
pub fn free_axes(axis: usize) -> [usize; 2] {
    match axis {
        0 => [1, 2],
        1 => [0, 2],
        2 => [0, 1],
        _ => panic!("axis must be 0, 1 or 2, got {axis}"),
    }
}

/// A dense 2D occupancy array of `0`/`1` cells.
///
/// `dims[0]` runs along the lower-numbered remaining axis and is the slowest
/// index: cell `(u, v)` lives at `u * dims[1] + v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    dims: [usize; 2],
    data: Vec<u8>,
}

impl Plane {
    /// Creates an all-empty plane.
    pub fn zeros(dims: [usize; 2]) -> Self {
        Self {
            dims,
            data: vec![0; dims[0] * dims[1]],
        }
    }

    /// Wraps existing cell data. Returns `None` if the length does not match.
    pub fn from_vec(dims: [usize; 2], data: Vec<u8>) -> Option<Self> {
        (data.len() == dims[0] * dims[1]).then_some(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the cell at `(u, v)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the plane.
    pub fn get(&self, u: usize, v: usize) -> u8 {
        assert!(u < self.dims[0] && v < self.dims[1], "cell ({u}, {v}) out of bounds");
        self.data[u * self.dims[1] + v]
    }

    pub(crate) fn set(&mut self, u: usize, v: usize, value: u8) {
        self.data[u * self.dims[1] + v] = value;
    }

    /// Number of occupied cells.
    pub fn count_occupied(&self) -> usize {
        self.data.iter().filter(|&&c| c != 0).count()
    }

    /// Copies a square `size × size` tile (indexed `u * size + v`) into the
    /// plane with its corner at `(u0, v0)`.
    ///
    /// Tiles that would not fit entirely are skipped and `false` is returned.
    pub(crate) fn blit(&mut self, u0: usize, v0: usize, size: usize, tile: &[u8]) -> bool {
        debug_assert_eq!(tile.len(), size * size);
        if u0 + size > self.dims[0] || v0 + size > self.dims[1] {
            return false;
        }
        for u in 0..size {
            let row = (u0 + u) * self.dims[1] + v0;
            self.data[row..row + size].copy_from_slice(&tile[u * size..(u + 1) * size]);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_axes() {
        assert_eq!(free_axes(0), [1, 2]);
        assert_eq!(free_axes(1), [0, 2]);
        assert_eq!(free_axes(2), [0, 1]);
    }

    #[test]
    fn test_blit_inside_and_outside() {
        let mut plane = Plane::zeros([4, 6]);
        let tile = vec![1u8; 4];
        assert!(plane.blit(2, 4, 2, &tile));
        assert_eq!(plane.get(3, 5), 1);
        assert_eq!(plane.get(1, 5), 0);
        assert_eq!(plane.count_occupied(), 4);

        assert!(!plane.blit(3, 0, 2, &tile));
        assert_eq!(plane.count_occupied(), 4);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Plane::from_vec([2, 2], vec![0; 3]).is_none());
        assert!(Plane::from_vec([2, 2], vec![0; 4]).is_some());
    }
}
