//! `crude-blend` library crate.
//!
//! The binary (`crude`) is a thin wrapper around this library so that:
//!
//! - fitting and blending are testable without spawning processes or touching
//!   the network
//! - the profile source can be swapped (`data::ProfileSource`)

pub mod app;
pub mod blend;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
