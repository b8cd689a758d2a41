//! HTTP front end for voxelization jobs.
//!
//! Serves slices and composites of the grids a job wrote to its directory,
//! plus the job's progress, log and result files. Every request is answered
//! from disk; no state is kept between requests.

mod error;
mod jobs;
mod route;
pub mod server;

pub use error::{RequestError, ServerError};
pub use jobs::{GridInfo, JobStore};
pub use route::{Axis, CheckKind, Route};
pub use server::SliceServer;

#[cfg(test)]
mod tests;
