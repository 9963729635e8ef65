//! Video ingestion core models and types
//!
//! Shared data structures and pure naming functions for the upload pipeline
//! and the playback tier that reads the same upload volume.

pub mod constants;
pub mod models;
pub mod naming;

pub use models::*;
