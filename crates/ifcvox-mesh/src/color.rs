//! Hex color parsing.

use crate::{MeshError, Result};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Opaque red, used when no color is given.
    pub const RED: Self = Self([0xff, 0x00, 0x00, 0xff]);

    /// Parses `rgb`, `rrggbb` or `rrggbbaa`. A missing alpha is opaque.
    pub fn parse(hex: &str) -> Result<Self> {
        let c = parse_components(hex)?;
        Ok(Self([c[0], c[1], c[2], c.get(3).copied().unwrap_or(0xff)]))
    }

    /// Packs the color so its little-endian bytes read R, G, B, A.
    pub fn packed(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

/// Parses a hex color into its 3 or 4 components, keeping track of whether
/// an alpha channel was present.
pub fn parse_components(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MeshError::Color(hex.to_string()));
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return Err(MeshError::Color(hex.to_string())),
    };
    (0..expanded.len() / 2)
        .map(|n| {
            u8::from_str_radix(&expanded[2 * n..2 * n + 2], 16)
                .map_err(|_| MeshError::Color(hex.to_string()))
        })
        .collect()
}
