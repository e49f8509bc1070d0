//! Command-line parsing for the crude blending tool.
//!
//! Argument parsing and command dispatch stay separate from the fitting and
//! blending code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "crude",
    version,
    about = "Fit crude oil distillation profiles and blend them by volume"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a crude's published distillation table.
    Profile(ProfileArgs),
    /// Fit a Gamma CDF to one crude's distillation profile.
    Fit(FitArgs),
    /// Blend two crudes by volume and report the mixture's distillation points.
    Blend(BlendArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
}

/// Options shared by every command that fetches from crudemonitor.ca.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Sample date: `recent` or YYYY-MM-DD.
    #[arg(short = 'd', long, default_value = "recent")]
    pub date: String,
}

/// Terminal plot size.
#[derive(Debug, Args, Clone)]
pub struct PlotSize {
    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ProfileArgs {
    /// Crude acronym, e.g. RA or MGS.
    pub acronym: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Crude acronym, e.g. RA or MGS.
    pub acronym: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    #[command(flatten)]
    pub size: PlotSize,

    /// Write an SVG figure of the fit.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export the fit (parameters, covariance, curve) to JSON.
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BlendArgs {
    /// First crude acronym.
    pub crude1: String,

    /// Second crude acronym.
    pub crude2: String,

    /// Volume of the first crude.
    #[arg(long, allow_negative_numbers = true)]
    pub vol1: f64,

    /// Volume of the second crude.
    #[arg(long, allow_negative_numbers = true)]
    pub vol2: f64,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Render an ASCII plot of the mixture curve in the terminal.
    #[arg(long)]
    pub plot: bool,

    #[command(flatten)]
    pub size: PlotSize,

    /// Write the three-panel SVG figure.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Export the mixture table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for plotting a saved fit.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Fit JSON file produced by `crude fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    #[command(flatten)]
    pub size: PlotSize,

    /// Also write an SVG figure of the saved fit.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}
