//! Upload Service
//!
//! Video ingestion and fan-out: accepts multipart uploads, stores them on the
//! shared upload volume, notifies the catalog and search services, and
//! launches HLS transcoding in the background.

pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
