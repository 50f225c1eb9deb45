//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the supported markets (`Market`)
//! - the normalized daily price table (`QuoteTable`, `QuoteRow`)
//! - rendering inputs/outputs (`ChartRequest`, `ChartArtifact`)

pub mod types;

pub use types::*;
