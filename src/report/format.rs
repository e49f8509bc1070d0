//! Formatted terminal output for profiles, fits and blends.
//!
//! Formatting lives here so the fitting/blending code stays free of
//! presentation concerns.

use crate::domain::{DistillationProfile, FitResult, MixtureBlend};

/// Print a fetched distillation table.
pub fn format_profile(profile: &DistillationProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} distillation profile ({}) ===\n", profile.acronym, profile.date));

    out.push_str(
        format!(
            "{:<6} {:>8} {:>12} {:>12} {:>12}\n",
            "label", "mass", "temp_oC", "avg_oC", "stddev_oC"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<8} {:-<12} {:-<12} {:-<12}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for row in &profile.rows {
        out.push_str(
            format!(
                "{:<6} {:>8.3} {:>12} {:>12} {:>12}\n",
                truncate(&row.label, 6),
                row.mass_fraction,
                fmt_opt(row.temperature),
                fmt_opt(row.average),
                fmt_opt(row.std_dev),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Parameters, covariance and fit diagnostics for one crude.
pub fn format_fit_summary(fit: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} gamma fit ({}) ===\n", fit.acronym, fit.date));
    out.push_str(&format!("Samples: n={}", fit.samples.len()));
    if let (Some(first), Some(last)) = (fit.samples.first(), fit.samples.last()) {
        out.push_str(&format!(
            " | T=[{:.1}, {:.1}] oC",
            first.temperature, last.temperature
        ));
    }
    out.push('\n');

    out.push_str(&format!("- alpha (shape): {:.6}\n", fit.params.shape));
    out.push_str(&format!("- beta  (scale): {:.6}\n", fit.params.scale));
    out.push_str(&format!("- SSE: {:.6e}\n", fit.sse));
    if fit.iterations > 0 {
        out.push_str(&format!("- iterations: {}\n", fit.iterations));
    }
    out.push_str("- covariance:\n");
    for row in &fit.covariance {
        out.push_str(&format!("    [{}, {}]\n", fmt_cov(row[0]), fmt_cov(row[1])));
    }

    out
}

/// The two-column mixture table: target fraction and temperature.
pub fn format_mixture_table(blend: &MixtureBlend) -> String {
    let req = &blend.request;
    let mut out = String::new();
    out.push_str(&format!(
        "=== Mixture: {} (vol={}) + {} (vol={}) [{}] ===\n",
        req.crude1, req.vol1, req.crude2, req.vol2, req.date
    ));
    out.push_str(&format!(
        "Model: {:.2} F({}) + {:.2} F({})\n",
        blend.weights.0, req.crude1, blend.weights.1, req.crude2
    ));
    out.push_str(&format!(
        "{}: alpha={:.3} beta={:.3} | {}: alpha={:.3} beta={:.3}\n\n",
        req.crude1,
        blend.fit1.params.shape,
        blend.fit1.params.scale,
        req.crude2,
        blend.fit2.params.shape,
        blend.fit2.params.scale,
    ));

    out.push_str(&format!("{:>16} {:>16}\n", "Mass % Recovered", "Temperature (oC)"));
    out.push_str(&format!("{:->16} {:->16}\n", "", ""));
    for p in &blend.profile.points {
        out.push_str(&format!("{:>16} {:>16.2}\n", p.mass_fraction, p.temperature));
    }

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.1}")).unwrap_or_else(|| "-".to_string())
}

fn fmt_cov(v: f64) -> String {
    if v.is_finite() { format!("{v:.6e}") } else { "inf".to_string() }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::blend_fits;
    use crate::domain::{
        CurveGrid, GammaParams, MixtureRequest, ProfileDate, ProfileRow, Sample, TARGET_FRACTIONS,
    };
    use crate::math::linspace;

    fn fit(acronym: &str, shape: f64, scale: f64) -> FitResult {
        let params = GammaParams::new(shape, scale).unwrap();
        let temperatures = linspace(0.0, 600.0, 1000);
        let values = params.curve().unwrap().evaluate(&temperatures);
        FitResult {
            acronym: acronym.to_string(),
            date: ProfileDate::Recent,
            params,
            covariance: [[0.25, -0.5], [-0.5, f64::INFINITY]],
            curve: CurveGrid { temperatures, values },
            samples: vec![
                Sample { temperature: 35.0, mass_fraction: 0.0 },
                Sample { temperature: 590.0, mass_fraction: 0.95 },
            ],
            sse: 1.5e-4,
            iterations: 7,
        }
    }

    #[test]
    fn profile_table_marks_missing_values() {
        let profile = DistillationProfile {
            acronym: "RA".to_string(),
            date: ProfileDate::Recent,
            rows: vec![
                ProfileRow {
                    label: "IBP".to_string(),
                    mass_fraction: 0.0,
                    temperature: Some(34.1),
                    average: Some(33.6),
                    std_dev: Some(2.1),
                },
                ProfileRow {
                    label: "99".to_string(),
                    mass_fraction: 0.99,
                    temperature: None,
                    average: None,
                    std_dev: None,
                },
            ],
        };
        let txt = format_profile(&profile);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "=== RA distillation profile (recent) ===");
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("IBP"));
        assert!(lines[3].contains("34.1"));
        assert!(lines[4].ends_with('-'));
    }

    #[test]
    fn fit_summary_lists_parameters_and_covariance() {
        let txt = format_fit_summary(&fit("RA", 5.0, 60.0));
        assert!(txt.contains("alpha (shape): 5.000000"));
        assert!(txt.contains("beta  (scale): 60.000000"));
        assert!(txt.contains("Samples: n=2 | T=[35.0, 590.0] oC"));
        assert!(txt.contains("iterations: 7"));
        assert!(txt.contains("inf]"));
    }

    #[test]
    fn mixture_table_has_one_row_per_target() {
        let request = MixtureRequest::new("MGS", "RA", 10.0, 5.0).unwrap();
        let blend = blend_fits(&request, fit("MGS", 3.0, 80.0), fit("RA", 5.0, 60.0)).unwrap();
        let txt = format_mixture_table(&blend);

        assert!(txt.contains("Model: 0.67 F(MGS) + 0.33 F(RA)"));
        let rows: Vec<&str> = txt.lines().skip_while(|l| !l.starts_with("----")).skip(1).collect();
        assert_eq!(rows.len(), TARGET_FRACTIONS.len());

        let fractions: Vec<f64> = rows
            .iter()
            .map(|l| l.split_whitespace().next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(fractions, TARGET_FRACTIONS.to_vec());
    }
}
