//! The prepared mesh buffer: one flat binary artifact the viewer uploads
//! without further parsing.
//!
//! ## Binary Layout
//!
//! All values are little-endian.
//!
//! | Section | Contents |
//! |---------|----------|
//! | Header ×2 | [`BufferHeader`] (6 × `i32`), written twice |
//! | Face indices | `u32` × `face_index_count`, 0-based |
//! | Line indices | `u32` × `line_index_count`, 0-based |
//! | Objects | [`ObjectRecord`] (52 bytes) × `object_count` |
//! | Positions | `f32` × `vertex_component_count`, millimeters |
//! | Normals | `i8` × `normal_component_count` |

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::color::Rgba;
use crate::normals::{quad_normals, quantize_normal};
use crate::obj::PolygonSoup;
use crate::{MeshError, Result};

/// Positions are authored in meters; the viewer expects millimeters.
const POSITION_SCALE: f32 = 1000.0;

/// Object ids are placeholders; the consumer assigns real ids on upload.
const PLACEHOLDER_ID_BASE: i64 = 0xffff;

// The layout structs are written with the host byte order.
static_assertions::const_assert!(cfg!(target_endian = "little"));

/// Section counts, written twice at the start of the buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BufferHeader {
    pub object_count: i32,
    pub face_index_count: i32,
    pub line_index_count: i32,
    pub vertex_component_count: i32,
    pub normal_component_count: i32,
    pub reserved: i32,
}

static_assertions::assert_eq_size!(BufferHeader, [u8; 24]);

/// Per-object record.
///
/// Layout (52 bytes total):
///   - `[0..8]`   object_id `i64`
///   - `[8..12]`  start_face_index `i32`
///   - `[12..16]` start_line_index `i32` (reserved, 0)
///   - `[16..20]` face_index_count `i32`
///   - `[20..24]` line_index_count `i32` (reserved, 0)
///   - `[24..28]` vertex_component_count `i32`
///   - `[28..32]` min_vertex_index `i32`
///   - `[32..36]` max_vertex_index `i32`
///   - `[36..40]` density `f32` (reserved, 0)
///   - `[40..44]` color_pack_count `u32` (always 1)
///   - `[44..48]` color_pack_byte_size `u32`
///   - `[48..52]` packed_color `u32` (bytes R, G, B, A)
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectRecord {
    pub object_id: i64,
    pub start_face_index: i32,
    pub start_line_index: i32,
    pub face_index_count: i32,
    pub line_index_count: i32,
    pub vertex_component_count: i32,
    pub min_vertex_index: i32,
    pub max_vertex_index: i32,
    pub density: f32,
    pub color_pack_count: u32,
    pub color_pack_byte_size: u32,
    pub packed_color: u32,
}

static_assertions::assert_eq_size!(ObjectRecord, [u8; 52]);

/// A named object and its ranges in the combined buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshObject {
    pub name: String,
    /// First face index (in index units).
    pub face_start: usize,
    pub face_count: usize,
    /// First vertex component.
    pub vertex_start: usize,
    pub vertex_component_count: usize,
    pub min_vertex_index: u32,
    pub max_vertex_index: u32,
    pub color: Rgba,
}

/// Combined geometry of one or more polygon files.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffer {
    face_indices: Vec<u32>,
    line_indices: Vec<u32>,
    objects: Vec<MeshObject>,
    positions: Vec<f32>,
    normals: Vec<[i8; 3]>,
}

impl MeshBuffer {
    /// Concatenates the given files, offsetting each file's indices by the
    /// number of vertices that precede it.
    pub fn build(sources: &[(PolygonSoup, Rgba)]) -> Self {
        let mut buffer = Self::default();

        for (soup, color) in sources {
            let vertex_base = buffer.vertex_count() as u32;
            let face_base = buffer.face_indices.len();
            let component_base = buffer.positions.len();

            buffer
                .face_indices
                .extend(soup.faces.iter().map(|i| i + vertex_base));
            buffer
                .line_indices
                .extend(soup.lines.iter().map(|i| i + vertex_base));
            buffer.positions.extend_from_slice(&soup.positions);
            buffer.normals.extend(
                quad_normals(&soup.positions, &soup.faces)
                    .into_iter()
                    .map(quantize_normal),
            );

            for (n, group) in soup.groups.iter().enumerate() {
                let (face_end, vertex_end) = match soup.groups.get(n + 1) {
                    Some(next) => (next.face_start, next.vertex_start),
                    None => (soup.faces.len(), soup.positions.len()),
                };
                let face_start = face_base + group.face_start;
                let face_count = face_end - group.face_start;
                let faces = &buffer.face_indices[face_start..face_start + face_count];
                let min = faces.iter().copied().min().unwrap_or(0);
                let max = faces.iter().copied().max().unwrap_or(0);

                let vertex_start = component_base + group.vertex_start;
                let vertex_component_count = vertex_end - group.vertex_start;
                let first = (vertex_start / 3) as u32;
                let last = ((vertex_start + vertex_component_count) / 3) as u32;
                if face_count > 0 && (min < first || max >= last) {
                    tracing::warn!(
                        object = %group.name,
                        min,
                        max,
                        "object faces reference vertices outside its own range"
                    );
                }

                buffer.objects.push(MeshObject {
                    name: group.name.clone(),
                    face_start,
                    face_count,
                    vertex_start,
                    vertex_component_count,
                    min_vertex_index: min,
                    max_vertex_index: max,
                    color: *color,
                });
            }
        }

        tracing::debug!(
            objects = buffer.objects.len(),
            faces = buffer.face_indices.len() / 3,
            lines = buffer.line_indices.len() / 2,
            vertices = buffer.vertex_count(),
            "built mesh buffer"
        );
        buffer
    }

    /// Reads each `(path, color)` input and builds the buffer.
    pub fn from_files<P: AsRef<Path>>(inputs: &[(P, Rgba)]) -> Result<Self> {
        let sources = inputs
            .iter()
            .map(|(path, color)| Ok((PolygonSoup::read(path.as_ref())?, *color)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::build(&sources))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn objects(&self) -> &[MeshObject] {
        &self.objects
    }

    pub fn face_indices(&self) -> &[u32] {
        &self.face_indices
    }

    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    /// Quantized per-vertex normals.
    pub fn normals(&self) -> &[[i8; 3]] {
        &self.normals
    }

    pub fn header(&self) -> BufferHeader {
        BufferHeader {
            object_count: self.objects.len() as i32,
            face_index_count: self.face_indices.len() as i32,
            line_index_count: self.line_indices.len() as i32,
            vertex_component_count: self.positions.len() as i32,
            normal_component_count: (self.normals.len() * 3) as i32,
            reserved: 0,
        }
    }

    /// Object records in output order.
    pub fn records(&self) -> Vec<ObjectRecord> {
        self.objects
            .iter()
            .enumerate()
            .map(|(n, object)| ObjectRecord {
                object_id: PLACEHOLDER_ID_BASE + n as i64,
                start_face_index: object.face_start as i32,
                start_line_index: 0,
                face_index_count: object.face_count as i32,
                line_index_count: 0,
                vertex_component_count: object.vertex_component_count as i32,
                min_vertex_index: object.min_vertex_index as i32,
                max_vertex_index: object.max_vertex_index as i32,
                density: 0.0,
                color_pack_count: 1,
                color_pack_byte_size: (object.vertex_component_count / 3 * 4) as u32,
                packed_color: object.color.packed(),
            })
            .collect()
    }

    /// Exact size of the serialized buffer in bytes.
    pub fn byte_len(&self) -> usize {
        let h = self.header();
        2 * size_of::<BufferHeader>()
            + 4 * (h.face_index_count as usize + h.line_index_count as usize)
            + size_of::<ObjectRecord>() * h.object_count as usize
            + 4 * h.vertex_component_count as usize
            + h.normal_component_count as usize
    }

    /// Serializes the buffer. Every count is known before the first byte is
    /// written. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<usize> {
        let header = self.header();
        let scaled: Vec<f32> = self.positions.iter().map(|c| c * POSITION_SCALE).collect();
        let normals: Vec<i8> = self.normals.iter().flatten().copied().collect();

        w.write_all(bytemuck::bytes_of(&header))?;
        w.write_all(bytemuck::bytes_of(&header))?;
        w.write_all(bytemuck::cast_slice(&self.face_indices))?;
        w.write_all(bytemuck::cast_slice(&self.line_indices))?;
        w.write_all(bytemuck::cast_slice(&self.records()))?;
        w.write_all(bytemuck::cast_slice(&scaled))?;
        w.write_all(bytemuck::cast_slice(&normals))?;
        w.flush()?;
        Ok(self.byte_len())
    }

    /// Writes the buffer to `path`.
    pub fn write_file(&self, path: &Path) -> Result<usize> {
        let file = File::create(path).map_err(|e| MeshError::io(path, e))?;
        let written = self
            .write_to(BufWriter::new(file))
            .map_err(|e| MeshError::io(path, e))?;
        tracing::info!(path = %path.display(), bytes = written, "wrote mesh buffer");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup(text: &str) -> PolygonSoup {
        PolygonSoup::parse(text, Path::new("input.obj")).unwrap()
    }

    const QUAD: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\n";

    fn two_objects() -> String {
        format!(
            "g a\n{QUAD}g b\nv 0 0 1\nv 1 0 1\nv 1 1 1\nv 0 1 1\nf 5 6 7\nf 5 7 8\n"
        )
    }

    fn read_i32(bytes: &[u8], at: usize) -> i32 {
        i32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_quad_normals_in_output() {
        let buffer = MeshBuffer::build(&[(soup(QUAD), Rgba::RED)]);
        assert_eq!(buffer.normals(), &[[0, 0, 127]; 4]);

        let mut bytes = Vec::new();
        buffer.write_to(&mut bytes).unwrap();
        let normals = &bytes[bytes.len() - 12..];
        for v in normals.chunks(3) {
            assert_eq!(v, &[0, 0, 127]);
        }
    }

    #[test]
    fn test_two_objects_sum_to_totals() {
        let buffer = MeshBuffer::build(&[(soup(&two_objects()), Rgba::RED)]);
        let header = buffer.header();
        let records = buffer.records();
        assert_eq!(header.object_count, 2);
        assert_eq!(records.len(), 2);

        let faces: i32 = records.iter().map(|r| r.face_index_count).sum();
        let comps: i32 = records.iter().map(|r| r.vertex_component_count).sum();
        assert_eq!(faces, header.face_index_count);
        assert_eq!(comps, header.vertex_component_count);
        assert_eq!(header.face_index_count, 12);
        assert_eq!(header.vertex_component_count, 24);

        let second = records[1];
        assert_eq!({ second.start_face_index }, 6);
        assert_eq!({ second.min_vertex_index }, 4);
        assert_eq!({ second.max_vertex_index }, 7);
        assert_eq!({ second.color_pack_byte_size }, 16);
        assert_eq!({ second.object_id }, 0xffff + 1);
    }

    #[test]
    fn test_byte_length_matches_sections() {
        let buffer = MeshBuffer::build(&[(
            soup(&format!("{}l 1 8\n", two_objects())),
            Rgba::RED,
        )]);
        let mut bytes = Vec::new();
        let written = buffer.write_to(&mut bytes).unwrap();
        assert_eq!(written, bytes.len());

        let object_count = read_i32(&bytes, 0) as usize;
        let faces = read_i32(&bytes, 4) as usize;
        let lines = read_i32(&bytes, 8) as usize;
        let comps = read_i32(&bytes, 12) as usize;
        let normals = read_i32(&bytes, 16) as usize;
        assert_eq!(read_i32(&bytes, 20), 0);
        assert_eq!(&bytes[0..24], &bytes[24..48]);
        assert_eq!(lines, 2);

        let expected = 48 + 4 * faces + 4 * lines + 52 * object_count + 4 * comps + normals;
        assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn test_files_concatenate_with_vertex_offset() {
        let first = soup(&format!("g a\n{QUAD}"));
        let second = soup(&format!("g b\n{QUAD}l 1 3\n"));
        let green = Rgba::parse("0f0").unwrap();
        let buffer = MeshBuffer::build(&[(first, green), (second, Rgba::RED)]);

        assert_eq!(&buffer.face_indices()[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(buffer.line_indices(), &[4, 6]);
        let objects = buffer.objects();
        assert_eq!(objects[0].color, green);
        assert_eq!(objects[1].color, Rgba::RED);
        assert_eq!(objects[1].face_start, 6);
        assert_eq!(objects[1].vertex_start, 12);
        assert_eq!(objects[1].min_vertex_index, 4);
    }

    #[test]
    fn test_positions_scaled_to_millimeters() {
        let buffer = MeshBuffer::build(&[(soup("v 0.5 -1 2\n"), Rgba::RED)]);
        let mut bytes = Vec::new();
        buffer.write_to(&mut bytes).unwrap();
        // 48 header bytes + one 52-byte record, then positions.
        let at = 48 + 52;
        let x = f32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
        let y = f32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap());
        assert_eq!(x, 500.0);
        assert_eq!(y, -1000.0);
        let record = &bytes[48..100];
        assert_eq!(&record[48..52], &[0xff, 0x00, 0x00, 0xff]);
    }

    #[test]
    fn test_write_file_roundtrip_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("unsafe.obj");
        std::fs::write(&input, two_objects()).unwrap();
        let out = dir.path().join("buffer.bin");
        let buffer = MeshBuffer::from_files(&[(input, Rgba::RED)]).unwrap();
        let written = buffer.write_file(&out).unwrap();
        assert_eq!(std::fs::metadata(&out).unwrap().len() as usize, written);
    }
}
