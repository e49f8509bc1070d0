//! Two-crude mixture model.
//!
//! The blended curve is the volume-weighted sum of the two fitted CDFs,
//! evaluated on a fixed temperature grid. Representative points are read off
//! that grid by nearest value, so reported temperatures have grid resolution.

pub mod mixture;

pub use mixture::*;
