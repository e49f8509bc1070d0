//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments
//! - runs the fetch/fit/blend pipeline
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BlendArgs, Command, FitArgs, PlotArgs, ProfileArgs};
use crate::data::{CrudeMonitorClient, fetch_profile};
use crate::error::{AppError, EXIT_NO_DATA};

pub mod pipeline;

/// Entry point for the `crude` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Profile(args) => handle_profile(args),
        Command::Fit(args) => handle_fit(args),
        Command::Blend(args) => handle_blend(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// `RUST_LOG` wins; otherwise only warnings reach stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from an embedding process) is not an error for us.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_profile(args: ProfileArgs) -> Result<(), AppError> {
    let client = CrudeMonitorClient::from_env()?;
    let profile = fetch_profile(&client, &args.acronym, &args.source.date)?
        .ok_or_else(|| no_data(&format!("No distillation profile for '{}' ({}).", args.acronym, args.source.date)))?;

    println!("{}", crate::report::format_profile(&profile));
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let client = CrudeMonitorClient::from_env()?;
    let out = pipeline::run_fit(&client, &args.acronym, &args.source.date)?
        .ok_or_else(|| no_data(&format!("No fittable distillation profile for '{}' ({}).", args.acronym, args.source.date)))?;

    println!("{}", crate::report::format_fit_summary(&out.fit));

    if args.plot {
        let plot = crate::plot::render_ascii_fit(&out.fit, args.size.width, args.size.height);
        println!("{plot}");
    }

    if let Some(path) = &args.svg {
        crate::plot::render_fit_svg(&out.fit)?.save(path)?;
    }
    if let Some(path) = &args.export_fit {
        crate::io::curve::write_fit_json(path, &out.fit)?;
    }

    Ok(())
}

fn handle_blend(args: BlendArgs) -> Result<(), AppError> {
    let client = CrudeMonitorClient::from_env()?;
    let out = pipeline::blend(
        &client,
        &args.crude1,
        &args.crude2,
        args.vol1,
        args.vol2,
        &args.source.date,
    )?
    .ok_or_else(|| {
        no_data(&format!(
            "Cannot blend '{}' and '{}': a distillation profile is unavailable ({}).",
            args.crude1, args.crude2, args.source.date
        ))
    })?;

    println!("{}", crate::report::format_mixture_table(&out.blend));

    if args.plot {
        let plot = crate::plot::render_ascii_mixture(&out.blend, args.size.width, args.size.height);
        println!("{plot}");
    }

    if let Some(path) = &args.svg {
        out.figure.save(path)?;
    }
    if let Some(path) = &args.export {
        crate::io::export::write_mixture_csv(path, &out.blend)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let fit = crate::io::curve::read_fit_json(&args.fit)?.into_fit();

    println!("{}", crate::report::format_fit_summary(&fit));
    println!(
        "{}",
        crate::plot::render_ascii_fit(&fit, args.size.width, args.size.height)
    );

    if let Some(path) = &args.svg {
        crate::plot::render_fit_svg(&fit)?.save(path)?;
    }
    Ok(())
}

fn no_data(message: &str) -> AppError {
    AppError::new(EXIT_NO_DATA, message)
}
