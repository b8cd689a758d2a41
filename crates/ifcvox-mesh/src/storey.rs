//! Maps annotated objects to the building storey they stand on.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::obj::PolygonSoup;
use crate::{MeshError, Result};

/// A building storey as listed by the model export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Storey {
    pub global_id: String,
    pub elevation: f64,
}

/// One entry of the storey sidecar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreyAssignment {
    pub name: String,
    pub storey: String,
}

/// Lowest `z` of each object of a parsed polygon file, in object order.
///
/// Objects are the soup's groups, so geometry before the first marker counts
/// as the file-named object, as in the mesh buffer. An object without
/// vertices gets `+∞`.
pub fn object_elevations(soup: &PolygonSoup) -> Vec<(String, f64)> {
    soup.groups
        .iter()
        .enumerate()
        .map(|(n, group)| {
            let end = soup
                .groups
                .get(n + 1)
                .map_or(soup.positions.len(), |next| next.vertex_start);
            let lowest = soup.positions[group.vertex_start..end]
                .chunks_exact(3)
                .map(|v| f64::from(v[2]))
                .fold(f64::INFINITY, f64::min);
            (group.name.clone(), lowest)
        })
        .collect()
}

/// Assigns every object to the highest storey whose elevation lies strictly
/// below the object's elevation, or to the lowest storey if none does.
pub fn assign_storeys(
    objects: &[(String, f64)],
    storeys: &[Storey],
) -> Result<Vec<StoreyAssignment>> {
    if storeys.is_empty() {
        return Err(MeshError::NoStoreys);
    }
    let mut sorted = storeys.to_vec();
    sorted.sort_by(|a, b| a.elevation.total_cmp(&b.elevation));

    Ok(objects
        .iter()
        .map(|(name, z)| {
            let below = sorted.partition_point(|s| s.elevation < *z);
            StoreyAssignment {
                name: name.clone(),
                storey: sorted[below.saturating_sub(1)].global_id.clone(),
            }
        })
        .collect())
}

/// Reads a JSON list of storeys.
pub fn load_storeys(path: &Path) -> Result<Vec<Storey>> {
    let text = std::fs::read_to_string(path).map_err(|e| MeshError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

/// Computes the storey sidecar for a polygon file and writes it as JSON.
pub fn write_sidecar(polygons: &Path, storeys: &[Storey], out: &Path) -> Result<usize> {
    let soup = PolygonSoup::read(polygons)?;
    let assignments = assign_storeys(&object_elevations(&soup), storeys)?;
    let json = serde_json::to_string(&assignments)?;
    std::fs::write(out, &json).map_err(|e| MeshError::io(out, e))?;
    tracing::info!(
        path = %out.display(),
        objects = assignments.len(),
        "wrote storey sidecar"
    );
    Ok(assignments.len())
}
