//! Curve fitting.
//!
//! Responsibilities:
//!
//! - extract (temperature, recovered fraction) samples from a profile
//! - fit a Gamma CDF with Levenberg–Marquardt from a fixed initial guess
//! - sample the fitted curve for reporting and blending

pub mod fitter;

pub use fitter::*;
