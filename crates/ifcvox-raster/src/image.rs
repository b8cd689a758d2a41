//! Owned 8-bit images and PNG encoding.

use std::io::Cursor;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Grey,
    Rgb,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            Self::Grey => 1,
            Self::Rgb => 3,
        }
    }

    fn png_color(self) -> png::ColorType {
        match self {
            Self::Grey => png::ColorType::Grayscale,
            Self::Rgb => png::ColorType::Rgb,
        }
    }
}

/// Row-major pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl Image {
    /// Builds an image from cells indexed `(u, v)` of a `dims` plane.
    ///
    /// `u` runs left to right; `v` runs bottom to top.
    pub(crate) fn from_cells<T: Copy>(
        dims: [usize; 2],
        format: PixelFormat,
        cell: impl Fn(usize, usize) -> T,
        write: impl Fn(T, &mut Vec<u8>),
    ) -> Self {
        let [width, height] = dims;
        let mut pixels = Vec::with_capacity(width * height * format.channels());
        for row in 0..height {
            let v = height - 1 - row;
            for u in 0..width {
                write(cell(u, v), &mut pixels);
            }
        }
        Self {
            width: width as u32,
            height: height as u32,
            format,
            pixels,
        }
    }

    /// Pixel at column `x`, row `y` (top row is 0).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.format.channels();
        let at = (y as usize * self.width as usize + x as usize) * c;
        &self.pixels[at..at + c]
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png_buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(Cursor::new(&mut png_buf), self.width, self.height);
            encoder.set_color(self.format.png_color());
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
        }
        Ok(png_buf)
    }
}
