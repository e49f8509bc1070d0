//! Input/output helpers.
//!
//! - mixture table CSV export (`export`)
//! - fit JSON read/write (`curve`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
