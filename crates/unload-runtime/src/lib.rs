//! Runtime orchestration for the unload pipeline.
//!
//! Holds the export-agent boundary, the artifact wait monitor and the
//! per-period pipeline driver.

pub mod agent;
pub mod pipeline;
pub mod wait;

pub use unload_core as core;
pub use unload_data as data;
