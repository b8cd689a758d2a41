//! Per-vertex normals for quad-paired triangle soups.

use glam::Vec3;

const DEGENERATE_LENGTH: f32 = 1e-12;

/// Computes one normal per vertex for faces that arrive as coplanar pairs.
///
/// Faces `2n` and `2n + 1` form a quad; the normal is taken from the first
/// triangle's edges and written to every vertex of both triangles. A trailing
/// unpaired face uses its own normal. Unreferenced vertices keep a zero
/// normal.
pub fn quad_normals(positions: &[f32], faces: &[u32]) -> Vec<Vec3> {
    let vertex = |i: u32| {
        let i = i as usize * 3;
        Vec3::new(positions[i], positions[i + 1], positions[i + 2])
    };

    let mut normals = vec![Vec3::ZERO; positions.len() / 3];
    for pair in faces.chunks(6) {
        let [a, b, c] = [pair[0], pair[1], pair[2]].map(vertex);
        let n = face_normal(a, b, c);
        for &i in pair {
            normals[i as usize] = n;
        }
    }
    normals
}

/// Unit normal of triangle `abc`, or its per-component sign when the
/// triangle is degenerate.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let n = (b - a).cross(c - a);
    let len = n.length();
    if len > DEGENERATE_LENGTH {
        n / len
    } else {
        Vec3::new(snap(n.x), snap(n.y), snap(n.z))
    }
}

fn snap(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Quantizes a unit normal to signed bytes (`× 128`, truncated toward zero,
/// saturating at the `i8` range).
pub fn quantize_normal(n: Vec3) -> [i8; 3] {
    n.to_array().map(|c| (c * 128.0) as i8)
}
