//! Rendering: SVG figures (`svg`) and terminal plots (`ascii`).

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
