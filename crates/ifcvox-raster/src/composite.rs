//! Slice rendering and layer compositing.

use ifcvox_storage::Plane;

use crate::image::{Image, PixelFormat};
use crate::{LayerColor, RasterError, Result};

const EMPTY_GREY: u16 = 50;
const OCCUPIED_GREY: u16 = 255;

/// Darkens every `spacing`-th row and column to 5/8 of its value; cells on
/// both lines are darkened twice.
fn darken_grid<const N: usize>(cells: &mut [[u16; N]], dims: [usize; 2], spacing: usize) {
    if spacing == 0 {
        return;
    }
    for u in 0..dims[0] {
        for v in 0..dims[1] {
            let on_u = u % spacing == 0;
            let on_v = v % spacing == 0;
            if !on_u && !on_v {
                continue;
            }
            for c in &mut cells[u * dims[1] + v] {
                if on_u {
                    *c *= 5;
                }
                if on_v {
                    *c *= 5;
                }
                if on_u {
                    *c /= 8;
                }
                if on_v {
                    *c /= 8;
                }
            }
        }
    }
}

/// Renders a plane in grey: empty cells are 50, occupied 255. With
/// `grid > 0` chunk boundaries are drawn as darker lines.
pub fn render_slice(plane: &Plane, grid: usize) -> Image {
    let dims = plane.dims();
    let mut cells: Vec<[u16; 1]> = plane
        .data()
        .iter()
        .map(|&d| [if d > 0 { OCCUPIED_GREY } else { EMPTY_GREY }])
        .collect();
    darken_grid(&mut cells, dims, grid);
    Image::from_cells(
        dims,
        PixelFormat::Grey,
        |u, v| cells[u * dims[1] + v][0],
        |g, out| out.push(g as u8),
    )
}

/// Accumulates colored layers over a background.
///
/// The first layer paints every cell (background where empty). Later layers
/// only touch their occupied cells, either replacing the color or blending
/// with the layer's alpha.
#[derive(Debug, Clone)]
pub struct CompositeBuilder {
    background: [u8; 3],
    dims: [usize; 2],
    cells: Option<Vec<[u16; 3]>>,
}

impl CompositeBuilder {
    pub fn new(background: [u8; 3]) -> Self {
        Self {
            background,
            dims: [0, 0],
            cells: None,
        }
    }

    pub fn add(&mut self, plane: &Plane, color: LayerColor) -> Result<()> {
        let bg = self.background.map(u16::from);
        let fg = color.rgb.map(u16::from);
        let Some(cells) = self.cells.as_mut() else {
            self.dims = plane.dims();
            self.cells = Some(
                plane
                    .data()
                    .iter()
                    .map(|&d| if d > 0 { fg } else { bg })
                    .collect(),
            );
            return Ok(());
        };
        if plane.dims() != self.dims {
            return Err(RasterError::ShapeMismatch {
                expected: self.dims,
                got: plane.dims(),
            });
        }

        let alpha = color.alpha.map(|a| f64::from(a) / 255.0);
        for (cell, _) in cells.iter_mut().zip(plane.data()).filter(|(_, d)| **d > 0) {
            match alpha {
                None => *cell = fg,
                Some(a) => {
                    for (old, new) in cell.iter_mut().zip(fg) {
                        *old = (f64::from(*old) * (1.0 - a) + f64::from(new) * a) as u16;
                    }
                }
            }
        }
        Ok(())
    }

    /// Draws grid lines every `spacing` cells over what has been added so far.
    pub fn grid(&mut self, spacing: usize) {
        if let Some(cells) = self.cells.as_mut() {
            darken_grid(cells, self.dims, spacing);
        }
    }

    pub fn image(&self) -> Result<Image> {
        let cells = self.cells.as_ref().ok_or(RasterError::Empty)?;
        let dims = self.dims;
        Ok(Image::from_cells(
            dims,
            PixelFormat::Rgb,
            |u, v| cells[u * dims[1] + v],
            |rgb, out| out.extend(rgb.map(|c| c as u8)),
        ))
    }
}
