//! SVG figures for fits and blends (Plotters).
//!
//! Figures are the only rendering artifact the library produces. They are built
//! from finished `FitResult`/`MixtureBlend` values and never feed back into the
//! numbers.

use std::path::Path;

use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::domain::{FitResult, MixtureBlend};
use crate::error::AppError;

pub const FIT_FIGURE_SIZE: (u32, u32) = (1000, 600);
pub const BLEND_FIGURE_SIZE: (u32, u32) = (2000, 600);

const Y_RANGE: std::ops::Range<f64> = -0.05..1.0;
const ANNOTATION_Y: f64 = 0.75;
const ANNOTATION_STEP: f64 = 0.06;

/// A rendered SVG document.
#[derive(Debug, Clone)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub svg: String,
}

impl Figure {
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        std::fs::write(path, &self.svg)
            .map_err(|e| AppError::usage(format!("Failed to write figure '{}': {e}", path.display())))
    }
}

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Observed samples, fitted curve and parameter annotation for one crude.
pub fn render_fit_svg(fit: &FitResult) -> Result<Figure, AppError> {
    let (width, height) = FIT_FIGURE_SIZE;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        let title = format!("{} ({})", fit.acronym, fit.date);
        draw_fit_panel(&root, fit, &title).map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    }
    Ok(Figure { width, height, svg })
}

/// Three panels: crude 1 fit, crude 2 fit, and the blended curve.
pub fn render_blend_svg(blend: &MixtureBlend) -> Result<Figure, AppError> {
    let (width, height) = BLEND_FIGURE_SIZE;
    let req = &blend.request;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        let panels = root.split_evenly((1, 3));

        let title1 = format!("Crude 1 : {} (Vol={})", req.crude1, req.vol1);
        draw_fit_panel(&panels[0], &blend.fit1, &title1).map_err(draw_error)?;
        let title2 = format!("Crude 2 : {} (Vol={})", req.crude2, req.vol2);
        draw_fit_panel(&panels[1], &blend.fit2, &title2).map_err(draw_error)?;
        draw_mixture_panel(&panels[2], blend).map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    Ok(Figure { width, height, svg })
}

fn draw_fit_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fit: &FitResult,
    title: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let x_max = fit
        .curve
        .temperatures
        .last()
        .copied()
        .filter(|t| t.is_finite() && *t > 0.0)
        .unwrap_or(1.0);

    let mut chart = build_chart(area, title, x_max)?;

    chart.draw_series(
        fit.samples
            .iter()
            .map(|s| Circle::new((s.temperature, s.mass_fraction), 4, BLUE.filled())),
    )?;
    chart.draw_series(LineSeries::new(fit.curve.points(), &RED))?;

    let lines = [
        "Gamma fit params:".to_string(),
        format!("alpha : {:.3}", fit.params.shape),
        format!("beta : {:.3}", fit.params.scale),
    ];
    annotate(&mut chart, &lines)
}

fn draw_mixture_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    blend: &MixtureBlend,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let x_max = blend.curve.temperatures.last().copied().unwrap_or(1.0).max(1.0);
    let mut chart = build_chart(area, "Crude Mixture Distillation Profile", x_max)?;

    chart.draw_series(LineSeries::new(blend.curve.points(), &RED))?;
    chart.draw_series(
        blend
            .profile
            .points
            .iter()
            .map(|p| Circle::new((p.temperature, p.mass_fraction), 3, BLACK.filled())),
    )?;

    let req = &blend.request;
    let lines = [
        "Gamma mixture model:".to_string(),
        format!("{:.2} F({}) +", blend.weights.0, req.crude1),
        format!("{:.2} F({})", blend.weights.1, req.crude2),
    ];
    annotate(&mut chart, &lines)
}

fn build_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    title: &str,
    x_max: f64,
) -> Result<Chart<'a, DB>, DrawingAreaErrorKind<DB::ErrorType>> {
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, Y_RANGE)?;

    chart
        .configure_mesh()
        .x_desc("Temperature (oC)")
        .y_desc("Mass % Recovered")
        .label_style(("sans-serif", 14).into_font())
        .draw()?;

    Ok(chart)
}

fn annotate<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    lines: &[String],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    chart.draw_series(lines.iter().enumerate().map(|(i, line)| {
        Text::new(
            line.clone(),
            (0.0, ANNOTATION_Y - ANNOTATION_STEP * i as f64),
            ("sans-serif", 16).into_font(),
        )
    }))?;
    Ok(())
}

fn draw_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> AppError {
    AppError::failure(format!("Failed to render figure: {e}"))
}
