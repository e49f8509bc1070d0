//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output. Plot elements:
//! - fitted/mixture curve: `-` line
//! - observed samples: `o`
//! - reported mixture points: `*`
//!
//! The y axis is always the recovered mass fraction `[0, 1]`.

use crate::domain::{CurveGrid, FitResult, MixtureBlend};

/// Render a fit: curve plus the samples it was fitted to.
pub fn render_ascii_fit(fit: &FitResult, width: usize, height: usize) -> String {
    let samples: Vec<(f64, f64)> = fit.samples.iter().map(|s| (s.temperature, s.mass_fraction)).collect();
    let title = format!("{} ({})", fit.acronym, fit.date);
    render_plot(&title, &fit.curve, &samples, 'o', width, height)
}

/// Render a mixture curve with its reported target points.
pub fn render_ascii_mixture(blend: &MixtureBlend, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = blend
        .profile
        .points
        .iter()
        .map(|p| (p.temperature, p.mass_fraction))
        .collect();
    let title = format!(
        "{:.2} F({}) + {:.2} F({})",
        blend.weights.0, blend.request.crude1, blend.weights.1, blend.request.crude2
    );
    render_plot(&title, &blend.curve, &points, '*', width, height)
}

fn render_plot(
    title: &str,
    curve: &CurveGrid,
    markers: &[(f64, f64)],
    marker: char,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (t_min, t_max) = t_range(curve, markers).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = (0.0, 1.0);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so markers overlay it.
    let points: Vec<(f64, f64)> = curve.points().collect();
    draw_curve(&mut grid, &points, t_min, t_max, y_min, y_max);

    for &(t, m) in markers {
        if !(t.is_finite() && m.is_finite()) {
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let y = map_y(m, y_min, y_max, height);
        grid[y][x] = marker;
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: {title} | T=[{t_min:.1}, {t_max:.1}] oC | mass=[0, 1]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn t_range(curve: &CurveGrid, markers: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for &t in curve.temperatures.iter().chain(markers.iter().map(|(t, _)| t)) {
        if t.is_finite() {
            min_t = min_t.min(t);
            max_t = max_t.max(t);
        }
    }
    if min_t.is_finite() && max_t.is_finite() && max_t > min_t {
        Some((min_t, max_t))
    } else {
        None
    }
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !(t.is_finite() && y.is_finite()) {
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
