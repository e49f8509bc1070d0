//! Reporting: formatted terminal output (`format`).

pub mod format;

pub use format::*;
