//! Read access to job directories under the data root.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ifcvox_config::Config;
use ifcvox_raster::{CompositeBuilder, LayerColor, render_slice};
use ifcvox_storage::{ErrorKind, VoxelGrid, harmonize};
use serde::Serialize;

use crate::route::{Axis, CheckKind};
use crate::RequestError;

/// Extent of one grid as reported by `/info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridInfo {
    pub shape: [usize; 3],
    pub chunks: Option<[usize; 3]>,
    pub chunk_size: Option<usize>,
}

/// Resolves and reads files of the jobs below one data root.
#[derive(Debug, Clone)]
pub struct JobStore {
    data_root: PathBuf,
    max_layers: u32,
    chunk_grid: bool,
}

impl JobStore {
    pub fn new(data_root: impl Into<PathBuf>, max_layers: u32, chunk_grid: bool) -> Self {
        Self {
            data_root: data_root.into(),
            max_layers,
            chunk_grid,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.storage.data_root.clone(),
            config.server.max_layers,
            config.raster.chunk_grid,
        )
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    fn job_dir(&self, job: &str) -> PathBuf {
        self.data_root.join(job)
    }

    fn grid_base(&self, job: &str, num: u32) -> PathBuf {
        self.job_dir(job).join(format!("{num}.vox"))
    }

    pub fn load_grid(&self, job: &str, num: u32, lazy: bool) -> Result<VoxelGrid, RequestError> {
        Ok(VoxelGrid::load(&self.grid_base(job, num), lazy)?)
    }

    pub fn info(&self, job: &str, num: u32) -> Result<GridInfo, RequestError> {
        let grid = self.load_grid(job, num, true)?;
        Ok(GridInfo {
            shape: grid.shape(),
            chunks: grid.numchunks(),
            chunk_size: grid.chunk_size(),
        })
    }

    /// Grey PNG of one slice, with chunk boundaries drawn when enabled.
    pub fn slice_png(
        &self,
        job: &str,
        num: u32,
        axis: Axis,
        offset: usize,
    ) -> Result<Vec<u8>, RequestError> {
        let grid = self.load_grid(job, num, false)?;
        let plane = grid.slice(axis.index(), offset)?;
        let spacing = if self.chunk_grid {
            grid.chunk_size().unwrap_or(0)
        } else {
            0
        };
        Ok(render_slice(&plane, spacing).to_png()?)
    }

    pub fn count_slice(
        &self,
        job: &str,
        num: u32,
        axis: Axis,
        offset: usize,
    ) -> Result<usize, RequestError> {
        Ok(self.load_grid(job, num, false)?.count(axis.index(), offset)?)
    }

    /// Harmonizes every grid of the job and composites the requested layers
    /// in request order.
    ///
    /// Grids `0..max_layers` that exist all shape the shared frame; those not
    /// drawn are loaded without their payload. Layer numbers at or beyond
    /// `max_layers` are not found.
    pub fn multi_slice_png(
        &self,
        job: &str,
        background: LayerColor,
        axis: Axis,
        offset: usize,
        layers: &[(u32, LayerColor)],
    ) -> Result<Vec<u8>, RequestError> {
        let used: BTreeSet<u32> = layers.iter().map(|(num, _)| *num).collect();
        if let Some(beyond) = used.iter().find(|&&n| n >= self.max_layers) {
            return Err(RequestError::NotFound(format!(
                "grid {beyond} of job {job} (at most {} layers)",
                self.max_layers
            )));
        }

        let mut nums = Vec::new();
        let mut grids = Vec::new();
        for num in 0..self.max_layers {
            match VoxelGrid::load(&self.grid_base(job, num), !used.contains(&num)) {
                Ok(grid) => {
                    nums.push(num);
                    grids.push(grid);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(missing) = used.iter().find(|n| !nums.contains(n)) {
            return Err(RequestError::NotFound(format!("grid {missing} of job {job}")));
        }

        let numchunks = harmonize(&mut grids)?;
        tracing::debug!(job, grids = grids.len(), ?numchunks, "harmonized job grids");

        let mut builder = CompositeBuilder::new(background.rgb);
        let mut spacing = 0;
        for (num, color) in layers {
            let Some(at) = nums.iter().position(|n| n == num) else {
                continue;
            };
            let grid = &grids[at];
            builder.add(&grid.slice(axis.index(), offset)?, *color)?;
            spacing = grid.chunk_size().unwrap_or(0);
        }
        if self.chunk_grid && spacing > 0 {
            builder.grid(spacing);
        }
        Ok(builder.image()?.to_png()?)
    }

    /// Size in bytes of the job's `progress` file.
    pub fn progress(&self, job: &str) -> Result<u64, RequestError> {
        Ok(std::fs::metadata(self.job_dir(job).join("progress"))?.len())
    }

    /// Safety barrier progress: 5 points per grid whose contents were written.
    pub fn safety_barrier_progress(&self, job: &str) -> Result<u32, RequestError> {
        let mut progress = 0;
        for entry in std::fs::read_dir(self.job_dir(job))? {
            if entry?.file_name().to_string_lossy().ends_with(".vox.contents") {
                progress += 5;
            }
        }
        Ok(progress)
    }

    /// Parsed lines of the job's `log.json`. Lines that are not JSON are
    /// skipped.
    pub fn log(&self, job: &str) -> Result<Vec<serde_json::Value>, RequestError> {
        let path = self.job_dir(job).join("log.json");
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RequestError::Unavailable(format!("no log for job {job}")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(job, error = %e, "skipping malformed log line");
                    None
                }
            })
            .collect())
    }

    /// Resolves a result file. `annotation` and `metadata` name the mesh
    /// buffer and its sidecar; any other part must be a plain file name
    /// inside the job directory.
    pub fn result_file(
        &self,
        check: CheckKind,
        job: &str,
        part: &str,
    ) -> Result<PathBuf, RequestError> {
        let name = match part {
            "annotation" => "buffer.bin",
            "metadata" => "data.json",
            other => other,
        };
        let plain = Path::new(name)
            .file_name()
            .is_some_and(|f| f == name && name != "." && name != "..");
        let path = self.job_dir(job).join(name);
        if !plain || !path.is_file() {
            return Err(RequestError::NotFound(format!("{check:?} file {part:?} of job {job}")));
        }
        Ok(path)
    }
}
