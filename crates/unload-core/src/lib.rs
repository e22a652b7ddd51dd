//! Core domain layer for the trade-statistics unload pipeline.
//!
//! Holds the record types flowing through the pipeline stages, the shared
//! error enum, period arithmetic and selection parsing, reference-dictionary
//! loading and CLI settings.

pub mod error;
pub mod models;
pub mod period;
pub mod reference;
pub mod settings;
