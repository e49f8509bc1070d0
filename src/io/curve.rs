//! Read/write fit JSON files.
//!
//! A fit file is the portable form of a `FitResult`: parameters, covariance,
//! the samples it was fitted to, and the evaluated curve for quick re-plotting.
//! The schema is `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitFile, FitResult};
use crate::error::AppError;

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit: &FitResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &FitFile::from_fit(fit))
        .map_err(|e| AppError::usage(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let fit: FitFile =
        serde_json::from_reader(file).map_err(|e| AppError::usage(format!("Invalid fit JSON: {e}")))?;
    crate::domain::GammaParams::new(fit.params.shape, fit.params.scale)
        .map_err(|e| AppError::usage(format!("Invalid fit JSON: {e}")))?;
    if fit.grid.temperatures.len() != fit.grid.values.len() {
        return Err(AppError::usage(format!(
            "Invalid fit JSON: grid has {} temperatures but {} values.",
            fit.grid.temperatures.len(),
            fit.grid.values.len()
        )));
    }
    Ok(fit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveGrid, GammaParams, ProfileDate, Sample};
    use crate::error::EXIT_USAGE;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("crude-blend-{}-{name}", std::process::id()))
    }

    #[test]
    fn fit_file_survives_disk() {
        let fit = FitResult {
            acronym: "RA".to_string(),
            date: ProfileDate::parse("2020-06-10").unwrap(),
            params: GammaParams::new(4.2, 71.5).unwrap(),
            covariance: [[0.01, 0.2], [0.2, f64::INFINITY]],
            curve: CurveGrid {
                temperatures: vec![0.0, 100.0, 200.0],
                values: vec![0.0, 0.4, 0.9],
            },
            samples: vec![Sample { temperature: 100.0, mass_fraction: 0.4 }],
            sse: 1e-3,
            iterations: 9,
        };

        let path = temp_path("fit.json");
        write_fit_json(&path, &fit).unwrap();
        let back = read_fit_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.acronym, "RA");
        assert_eq!(back.date, fit.date);
        assert_eq!(back.params, fit.params);
        assert_eq!(back.covariance[1][1], None);
        assert_eq!(back.grid, fit.curve);
        assert!(back.into_fit().covariance[1][1].is_infinite());
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let path = temp_path("bad.json");
        let json = r#"{"tool":"crude","acronym":"RA","date":"recent",
            "params":{"shape":5.0,"scale":60.0},
            "covariance":[[1.0,0.0],[0.0,1.0]],"sse":0.0,"samples":[],
            "grid":{"temperatures":[0.0,1.0],"values":[0.0]}}"#;
        std::fs::write(&path, json).unwrap();
        let err = read_fit_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.is_usage());
        assert!(err.message().contains("grid"));
    }

    #[test]
    fn invalid_parameters_are_a_usage_error() {
        let path = temp_path("negative.json");
        let json = r#"{"tool":"crude","acronym":"RA","date":"recent",
            "params":{"shape":-1.0,"scale":60.0},
            "covariance":[[null,null],[null,null]],"sse":0.0,"samples":[],
            "grid":{"temperatures":[0.0],"values":[0.0]}}"#;
        std::fs::write(&path, json).unwrap();
        let err = read_fit_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = read_fit_json(&temp_path("does-not-exist.json")).unwrap_err();
        assert!(err.is_usage());
    }
}
