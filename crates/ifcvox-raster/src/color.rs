use crate::{RasterError, Result};

/// A layer color from a request path: `rrggbb`, optionally followed by an
/// alpha byte that switches the layer to blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerColor {
    pub rgb: [u8; 3],
    pub alpha: Option<u8>,
}

impl LayerColor {
    pub const fn opaque(rgb: [u8; 3]) -> Self {
        Self { rgb, alpha: None }
    }

    /// Parses consecutive hex digit pairs. Exactly three or four pairs are
    /// accepted.
    pub fn parse(hex: &str) -> Result<Self> {
        let invalid = || RasterError::Color(hex.to_string());
        if hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let bytes = (0..hex.len() / 2)
            .map(|n| u8::from_str_radix(&hex[2 * n..2 * n + 2], 16).map_err(|_| invalid()))
            .collect::<Result<Vec<u8>>>()?;
        match bytes[..] {
            [r, g, b] => Ok(Self::opaque([r, g, b])),
            [r, g, b, a] => Ok(Self {
                rgb: [r, g, b],
                alpha: Some(a),
            }),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        assert_eq!(
            LayerColor::parse("eeeeee").unwrap(),
            LayerColor::opaque([0xee, 0xee, 0xee])
        );
        let blended = LayerColor::parse("ff000080").unwrap();
        assert_eq!(blended.rgb, [0xff, 0, 0]);
        assert_eq!(blended.alpha, Some(0x80));
    }

    #[test]
    fn test_rejects_other_lengths() {
        for bad in ["", "fff", "ffff", "fffffffff", "ff00zz", "ff0000ff00"] {
            assert!(LayerColor::parse(bad).is_err(), "{bad:?}");
        }
    }
}
