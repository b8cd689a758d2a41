//! Symbolic descriptors for implicit chunks.
//!
//! Each line of `<base>.primitives` describes one implicit chunk as
//! comma-separated terms. `CONST…` fills the chunk; `X=n`, `Y=n` or `Z=n`
//! fills the full plane at in-chunk offset `n` along that axis. Terms are
//! unioned.

use crate::plane::free_axes;

const AXIS_NAMES: [char; 3] = ['X', 'Y', 'Z'];

/// One term of an implicit-chunk descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// Every voxel of the chunk is occupied.
    Constant,
    /// The plane at `offset` along `axis` is occupied.
    Planar {
        /// Axis index: 0 = X, 1 = Y, 2 = Z.
        axis: usize,
        /// In-chunk offset along `axis`.
        offset: usize,
    },
}

/// A parsed descriptor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    terms: Vec<Term>,
}

impl Primitive {
    /// Parses one descriptor line for a chunk of edge length `chunk_size`.
    pub fn parse(line: &str, chunk_size: usize) -> Result<Self, String> {
        let terms = line
            .split(',')
            .map(|raw| parse_term(raw.trim(), chunk_size))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Evaluates the descriptor on the plane at `sub` along `axis`.
    ///
    /// Returns a `chunk_size²` tile indexed like [`crate::bit_plane::chunk_plane`].
    pub fn rasterize(&self, axis: usize, sub: usize, chunk_size: usize) -> Vec<u8> {
        let cs = chunk_size;
        let [a0, a1] = free_axes(axis);
        let mut tile = vec![0u8; cs * cs];
        for term in &self.terms {
            match *term {
                Term::Constant => tile.fill(1),
                Term::Planar { axis: ta, offset } if ta == axis => {
                    if offset == sub {
                        tile.fill(1);
                    }
                }
                Term::Planar { axis: ta, offset } if ta == a0 => {
                    tile[offset * cs..(offset + 1) * cs].fill(1);
                }
                Term::Planar { axis: ta, offset } => {
                    debug_assert_eq!(ta, a1);
                    for u in 0..cs {
                        tile[u * cs + offset] = 1;
                    }
                }
            }
        }
        tile
    }
}

fn parse_term(term: &str, chunk_size: usize) -> Result<Term, String> {
    if term.starts_with("CONST") {
        return Ok(Term::Constant);
    }
    let (axis, offset) = term
        .split_once('=')
        .ok_or_else(|| format!("term {term:?} is neither CONST nor AXIS=OFFSET"))?;
    let mut axis_chars = axis.trim().chars();
    let axis = match (axis_chars.next(), axis_chars.next()) {
        (Some(c), None) => AXIS_NAMES
            .iter()
            .position(|&n| n == c)
            .ok_or_else(|| format!("unknown axis {c:?} in term {term:?}"))?,
        _ => return Err(format!("unknown axis in term {term:?}")),
    };
    let offset: usize = offset
        .trim()
        .parse()
        .map_err(|_| format!("invalid offset in term {term:?}"))?;
    if offset >= chunk_size {
        return Err(format!(
            "offset {offset} in term {term:?} exceeds chunk size {chunk_size}"
        ));
    }
    Ok(Term::Planar { axis, offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_terms() {
        let p = Primitive::parse("Z=3, X=0", 8).unwrap();
        assert_eq!(
            p.terms(),
            &[
                Term::Planar { axis: 2, offset: 3 },
                Term::Planar { axis: 0, offset: 0 },
            ]
        );
        assert_eq!(Primitive::parse("CONST", 8).unwrap().terms(), &[Term::Constant]);
        assert_eq!(
            Primitive::parse("CONSTANT_1", 8).unwrap().terms(),
            &[Term::Constant]
        );
    }

    #[test]
    fn test_malformed_terms() {
        for bad in ["", "Z", "W=1", "Z=x", "Z=8", "XY=1", "Z=1,,X=2"] {
            assert!(Primitive::parse(bad, 8).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn test_constant_fills_everything() {
        let p = Primitive::parse("CONST", 8).unwrap();
        for axis in 0..3 {
            for sub in 0..8 {
                assert!(p.rasterize(axis, sub, 8).iter().all(|&c| c == 1));
            }
        }
    }

    #[test]
    fn test_planar_on_slice_axis() {
        let p = Primitive::parse("Z=3", 8).unwrap();
        assert!(p.rasterize(2, 3, 8).iter().all(|&c| c == 1));
        assert!(p.rasterize(2, 4, 8).iter().all(|&c| c == 0));
    }

    #[test]
    fn test_planar_on_other_axes() {
        // Slicing along Y: free axes are X (rows) and Z (columns).
        let p = Primitive::parse("X=2,Z=5", 8).unwrap();
        let tile = p.rasterize(1, 0, 8);
        for u in 0..8 {
            for v in 0..8 {
                let expected = u8::from(u == 2 || v == 5);
                assert_eq!(tile[u * 8 + v], expected, "({u},{v})");
            }
        }
        assert_eq!(tile.iter().filter(|&&c| c == 1).count(), 8 + 8 - 1);
    }
}
