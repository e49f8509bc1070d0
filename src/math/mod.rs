//! Mathematical utilities: Gamma CDF evaluation and nonlinear least squares.

pub mod gamma;
pub mod lm;

pub use gamma::*;
pub use lm::*;
