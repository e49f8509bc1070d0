//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request types (`ProfileDate`, `MixtureRequest`)
//! - parsed assay tables (`DistillationProfile`, `ProfileRow`, `Sample`)
//! - fit and blend outputs (`FitResult`, `MixtureBlend`, `MixtureProfile`)

pub mod types;

pub use types::*;
