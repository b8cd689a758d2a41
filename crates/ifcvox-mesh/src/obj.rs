//! Parser for the line-based polygon/line soup written by the voxelizer's
//! mesh export.
//!
//! Recognized lines: `v x y z`, `f i j k` (1-based, `/…` suffixes ignored),
//! `l i j`, and `g name` / `o name` group markers. Everything else is skipped.

use std::path::{Path, PathBuf};

use crate::{MeshError, Result};

/// Start of a named object within one polygon file, in file-local counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMarker {
    /// Object name from the marker line.
    pub name: String,
    /// Number of face indices seen before the marker.
    pub face_start: usize,
    /// Number of line indices seen before the marker.
    pub line_start: usize,
    /// Number of vertex components seen before the marker.
    pub vertex_start: usize,
}

/// Geometry of one polygon file with 0-based, file-local indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSoup {
    /// Flat vertex components, three per vertex.
    pub positions: Vec<f32>,
    /// Triangle indices, three per face.
    pub faces: Vec<u32>,
    /// Segment indices, two per line.
    pub lines: Vec<u32>,
    /// Object boundaries in file order.
    pub groups: Vec<GroupMarker>,
}

impl PolygonSoup {
    /// Reads and parses a polygon file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| MeshError::io(path, e))?;
        Self::parse(&text, path)
    }

    /// Parses polygon text. `source` names the file in error messages and
    /// provides the name of an object that precedes the first marker.
    pub fn parse(text: &str, source: &Path) -> Result<Self> {
        let err = |line: usize, reason: String| MeshError::Format {
            file: PathBuf::from(source),
            line,
            reason,
        };

        let mut soup = Self::default();
        for (n, raw) in text.lines().enumerate() {
            let line_no = n + 1;
            let mut parts = raw.split_whitespace();
            let Some(tag) = parts.next() else { continue };
            match tag {
                "v" => {
                    soup.ensure_group(source);
                    for part in parts {
                        let c: f32 = part
                            .parse()
                            .map_err(|_| err(line_no, format!("invalid coordinate {part:?}")))?;
                        soup.positions.push(c);
                    }
                }
                "f" | "l" => {
                    soup.ensure_group(source);
                    let indices = parts
                        .map(|p| parse_index(p).ok_or_else(|| err(line_no, format!("invalid index {p:?}"))))
                        .collect::<Result<Vec<u32>>>()?;
                    let expected = if tag == "f" { 3 } else { 2 };
                    if indices.len() != expected {
                        return Err(err(
                            line_no,
                            format!("`{tag}` needs {expected} indices, got {}", indices.len()),
                        ));
                    }
                    let target = if tag == "f" {
                        &mut soup.faces
                    } else {
                        &mut soup.lines
                    };
                    target.extend(indices);
                }
                "g" | "o" => {
                    let name = raw.trim()[1..].trim();
                    if name.is_empty() {
                        return Err(err(line_no, "group marker without a name".into()));
                    }
                    soup.push_group(name.to_string());
                }
                _ => {}
            }
        }

        if soup.positions.len() % 3 != 0 {
            return Err(err(
                0,
                format!(
                    "{} vertex components is not a multiple of 3",
                    soup.positions.len()
                ),
            ));
        }
        let vertex_count = soup.vertex_count() as u32;
        if let Some(&bad) = soup
            .faces
            .iter()
            .chain(&soup.lines)
            .find(|&&i| i >= vertex_count)
        {
            return Err(err(
                0,
                format!("index {} exceeds vertex count {vertex_count}", bad + 1),
            ));
        }
        Ok(soup)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles.
    pub fn face_count(&self) -> usize {
        self.faces.len() / 3
    }

    fn push_group(&mut self, name: String) {
        self.groups.push(GroupMarker {
            name,
            face_start: self.faces.len(),
            line_start: self.lines.len(),
            vertex_start: self.positions.len(),
        });
    }

    /// Geometry before the first marker belongs to an object named after the file.
    fn ensure_group(&mut self, source: &Path) {
        if self.groups.is_empty() {
            let name = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.push_group(name);
        }
    }
}

/// Parses a 1-based index token, dropping any `/…` attribute suffix, and
/// returns it 0-based.
fn parse_index(token: &str) -> Option<u32> {
    let head = token.split('/').next()?;
    let index: u32 = head.parse().ok()?;
    index.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PolygonSoup> {
        PolygonSoup::parse(text, Path::new("safe.obj"))
    }

    #[test]
    fn test_parse_groups_and_geometry() {
        let soup = parse(
            "# comment\ng first\nv 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\ng second\nv 0 1 0\nf 1/1 3/3 4/4\nl 1 4\n",
        )
        .unwrap();
        assert_eq!(soup.vertex_count(), 4);
        assert_eq!(soup.faces, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(soup.lines, vec![0, 3]);
        assert_eq!(soup.groups.len(), 2);
        assert_eq!(soup.groups[1].name, "second");
        assert_eq!(soup.groups[1].face_start, 3);
        assert_eq!(soup.groups[1].vertex_start, 9);
        assert_eq!(soup.groups[1].line_start, 0);
    }

    #[test]
    fn test_geometry_before_marker_gets_file_object() {
        let soup = parse("v 0 0 0\nv 1 0 0\nl 1 2\no tail\nv 2 0 0\n").unwrap();
        assert_eq!(soup.groups.len(), 2);
        assert_eq!(soup.groups[0].name, "safe");
        assert_eq!(soup.groups[0].vertex_start, 0);
        assert_eq!(soup.groups[1].name, "tail");
    }

    #[test]
    fn test_wrong_arity_is_format_error() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 5, .. }), "{err}");
        let err = parse("v 0 0 0\nv 1 0 0\nl 1\n").unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_component_count_must_divide_by_three() {
        let err = parse("v 0 0 0 1\n").unwrap_err();
        assert!(matches!(err, MeshError::Format { line: 0, .. }), "{err}");
    }

    #[test]
    fn test_bad_indices() {
        assert!(parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 0 1 2\n").is_err());
        assert!(parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 9\n").is_err());
        assert!(parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf a b c\n").is_err());
    }
}
