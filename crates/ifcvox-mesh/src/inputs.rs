//! Argument handling for the mesh encoder.

use std::path::PathBuf;

use crate::{MeshError, Result, Rgba};

/// One polygon file and the color its objects are drawn with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub color: Rgba,
}

/// Splits encoder arguments into the output path and the colored inputs.
///
/// Accepted forms are `out in` (drawn in red) and
/// `out in1 color1 [in2 color2 ...]`. Any other argument count is
/// [`MeshError::Arguments`]; a bad color is [`MeshError::Color`].
pub fn parse_encode_args(args: &[String]) -> Result<(PathBuf, Vec<InputFile>)> {
    let Some((output, rest)) = args.split_first() else {
        return Err(MeshError::Arguments("missing output path".into()));
    };
    let inputs = match rest {
        [] => return Err(MeshError::Arguments("no input files".into())),
        [single] => vec![InputFile {
            path: PathBuf::from(single),
            color: Rgba::RED,
        }],
        pairs if pairs.len() % 2 == 0 => pairs
            .chunks_exact(2)
            .map(|pair| {
                Ok(InputFile {
                    path: PathBuf::from(&pair[0]),
                    color: Rgba::parse(&pair[1])?,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        _ => {
            return Err(MeshError::Arguments(
                "expected `out in` or `out in1 color1 [in2 color2 ...]`".into(),
            ));
        }
    };
    Ok((PathBuf::from(output), inputs))
}
