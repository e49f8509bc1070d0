//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - used in-memory during fitting and blending
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::GammaCurve;

/// Mass fractions reported for a blended profile, in output order.
pub const TARGET_FRACTIONS: [f64; 12] = [0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 0.99];

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Which published sample to request for a crude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ProfileDate {
    /// The most recent published sample.
    #[default]
    Recent,
    /// The sample published on a specific day.
    On(NaiveDate),
}

impl ProfileDate {
    /// Parse `recent` or a `YYYY-MM-DD` calendar date.
    ///
    /// Anything else is a caller error.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed == "recent" {
            return Ok(ProfileDate::Recent);
        }
        if !DATE_SHAPE.is_match(trimmed) {
            return Err(AppError::usage(format!(
                "Invalid date '{raw}': must be either 'recent' or in format YYYY-MM-DD."
            )));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(ProfileDate::On)
            .map_err(|e| AppError::usage(format!("Invalid date '{raw}': {e}.")))
    }

    /// Value for the remote `time` query parameter.
    pub fn as_query(&self) -> String {
        match self {
            ProfileDate::Recent => "recent".to_string(),
            ProfileDate::On(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for ProfileDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query())
    }
}

impl From<ProfileDate> for String {
    fn from(value: ProfileDate) -> Self {
        value.as_query()
    }
}

impl TryFrom<String> for ProfileDate {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ProfileDate::parse(&value)
    }
}

/// One row of a published distillation table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    /// Row label as printed on the page (`IBP`, `5`, `10`, ...).
    pub label: String,
    /// Recovered mass fraction in `[0, 1]`.
    pub mass_fraction: f64,
    /// Sample boiling temperature (°C), if measured.
    pub temperature: Option<f64>,
    /// Historical average temperature (°C).
    pub average: Option<f64>,
    /// Historical standard deviation (°C).
    pub std_dev: Option<f64>,
}

/// An observed (temperature, recovered fraction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub temperature: f64,
    pub mass_fraction: f64,
}

/// Distillation table for one crude at one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DistillationProfile {
    pub acronym: String,
    pub date: ProfileDate,
    pub rows: Vec<ProfileRow>,
}

impl DistillationProfile {
    /// Rows with a measured temperature, in table order.
    pub fn samples(&self) -> Vec<Sample> {
        self.rows
            .iter()
            .filter_map(|row| {
                row.temperature.map(|temperature| Sample {
                    temperature,
                    mass_fraction: row.mass_fraction,
                })
            })
            .collect()
    }
}

/// Gamma distribution parameters (shape `a`, scale `b`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaParams {
    pub shape: f64,
    pub scale: f64,
}

impl GammaParams {
    pub fn new(shape: f64, scale: f64) -> Result<Self, AppError> {
        if !(shape.is_finite() && scale.is_finite() && shape > 0.0 && scale > 0.0) {
            return Err(AppError::failure(format!(
                "Gamma parameters must be finite and positive (shape={shape}, scale={scale})."
            )));
        }
        Ok(Self { shape, scale })
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.shape, self.scale]
    }

    pub fn curve(&self) -> Result<GammaCurve, AppError> {
        GammaCurve::new(self.shape, self.scale)
    }
}

/// A curve sampled on a temperature grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub temperatures: Vec<f64>,
    pub values: Vec<f64>,
}

impl CurveGrid {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.temperatures.iter().copied().zip(self.values.iter().copied())
    }
}

/// Gamma CDF fit for a single crude.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub acronym: String,
    pub date: ProfileDate,
    pub params: GammaParams,
    /// Parameter covariance, `[shape, scale]` ordering.
    pub covariance: [[f64; 2]; 2],
    /// Fitted CDF over `[0, max observed temperature]`.
    pub curve: CurveGrid,
    /// Observations the curve was fitted to.
    pub samples: Vec<Sample>,
    pub sse: f64,
    pub iterations: usize,
}

/// Two crudes and the volumes they are mixed in.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureRequest {
    pub crude1: String,
    pub crude2: String,
    pub vol1: f64,
    pub vol2: f64,
    pub date: ProfileDate,
}

impl MixtureRequest {
    /// Validate volumes: both finite and non-negative, with a positive total.
    pub fn new(
        crude1: impl Into<String>,
        crude2: impl Into<String>,
        vol1: f64,
        vol2: f64,
    ) -> Result<Self, AppError> {
        if !(vol1.is_finite() && vol2.is_finite()) {
            return Err(AppError::usage(format!(
                "Volumes must be finite (vol1={vol1}, vol2={vol2})."
            )));
        }
        if vol1 < 0.0 || vol2 < 0.0 {
            return Err(AppError::usage(format!(
                "Specified volumes 'vol1' and 'vol2' must be positive (vol1={vol1}, vol2={vol2})."
            )));
        }
        if vol1 + vol2 <= 0.0 {
            return Err(AppError::usage("Total volume must be greater than zero."));
        }
        Ok(Self {
            crude1: crude1.into(),
            crude2: crude2.into(),
            vol1,
            vol2,
            date: ProfileDate::Recent,
        })
    }

    pub fn with_date(mut self, date: ProfileDate) -> Self {
        self.date = date;
        self
    }

    pub fn total_volume(&self) -> f64 {
        self.vol1 + self.vol2
    }

    /// Volume fractions `(vol1/total, vol2/total)`.
    pub fn weights(&self) -> (f64, f64) {
        let total = self.total_volume();
        (self.vol1 / total, self.vol2 / total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixturePoint {
    pub mass_fraction: f64,
    pub temperature: f64,
}

/// Representative recovery/temperature pairs of a blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureProfile {
    pub points: Vec<MixturePoint>,
}

/// Everything computed for a two-crude blend.
#[derive(Debug, Clone)]
pub struct MixtureBlend {
    pub request: MixtureRequest,
    pub fit1: FitResult,
    pub fit2: FitResult,
    pub weights: (f64, f64),
    /// Volume-weighted CDF on the fixed blending grid.
    pub curve: CurveGrid,
    pub profile: MixtureProfile,
}

/// A saved fit (JSON).
///
/// Non-finite covariance entries are stored as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub acronym: String,
    pub date: ProfileDate,
    pub params: GammaParams,
    pub covariance: [[Option<f64>; 2]; 2],
    pub sse: f64,
    pub samples: Vec<Sample>,
    pub grid: CurveGrid,
}

impl FitFile {
    pub fn from_fit(fit: &FitResult) -> Self {
        let finite = |v: f64| if v.is_finite() { Some(v) } else { None };
        let c = fit.covariance;
        Self {
            tool: "crude".to_string(),
            acronym: fit.acronym.clone(),
            date: fit.date,
            params: fit.params,
            covariance: [
                [finite(c[0][0]), finite(c[0][1])],
                [finite(c[1][0]), finite(c[1][1])],
            ],
            sse: fit.sse,
            samples: fit.samples.clone(),
            grid: fit.curve.clone(),
        }
    }

    pub fn into_fit(self) -> FitResult {
        let value = |v: Option<f64>| v.unwrap_or(f64::INFINITY);
        let c = self.covariance;
        FitResult {
            acronym: self.acronym,
            date: self.date,
            params: self.params,
            covariance: [[value(c[0][0]), value(c[0][1])], [value(c[1][0]), value(c[1][1])]],
            curve: self.grid,
            samples: self.samples,
            sse: self.sse,
            iterations: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_date_accepts_recent_and_iso_dates() {
        assert_eq!(ProfileDate::parse("recent").unwrap(), ProfileDate::Recent);
        let date = ProfileDate::parse("2020-06-10").unwrap();
        assert_eq!(date, ProfileDate::On(NaiveDate::from_ymd_opt(2020, 6, 10).unwrap()));
        assert_eq!(date.as_query(), "2020-06-10");
    }

    #[test]
    fn profile_date_rejects_malformed_input_as_usage_error() {
        for raw in ["01-01-01", "2020-6-10", "yesterday", "2020-13-01", "2020-06-10T00:00"] {
            let err = ProfileDate::parse(raw).unwrap_err();
            assert!(err.is_usage(), "expected usage error for {raw}");
        }
    }

    #[test]
    fn mixture_request_validates_volumes() {
        assert!(MixtureRequest::new("MGS", "RA", 10.0, 5.0).is_ok());
        assert!(MixtureRequest::new("MGS", "RA", 0.0, 5.0).is_ok());
        assert!(MixtureRequest::new("MGS", "RA", -1.0, 5.0).unwrap_err().is_usage());
        assert!(MixtureRequest::new("MGS", "RA", 1.0, -5.0).unwrap_err().is_usage());
        assert!(MixtureRequest::new("MGS", "RA", 0.0, 0.0).unwrap_err().is_usage());
        assert!(MixtureRequest::new("MGS", "RA", f64::NAN, 1.0).unwrap_err().is_usage());
    }

    #[test]
    fn mixture_weights_sum_to_one() {
        let req = MixtureRequest::new("MGS", "RA", 10.0, 5.0).unwrap();
        let (w1, w2) = req.weights();
        assert!((w1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((w1 + w2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn samples_skip_missing_temperatures() {
        let row = |label: &str, fraction: f64, temperature: Option<f64>| ProfileRow {
            label: label.to_string(),
            mass_fraction: fraction,
            temperature,
            average: None,
            std_dev: None,
        };
        let profile = DistillationProfile {
            acronym: "RA".to_string(),
            date: ProfileDate::Recent,
            rows: vec![row("IBP", 0.0, Some(30.0)), row("5", 0.05, Some(70.0)), row("99", 0.99, None)],
        };
        let samples = profile.samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1], Sample { temperature: 70.0, mass_fraction: 0.05 });
    }

    #[test]
    fn fit_file_round_trips_infinite_covariance_as_null() {
        let fit = FitResult {
            acronym: "RA".to_string(),
            date: ProfileDate::Recent,
            params: GammaParams::new(4.0, 80.0).unwrap(),
            covariance: [[f64::INFINITY; 2]; 2],
            curve: CurveGrid { temperatures: vec![0.0, 1.0], values: vec![0.0, 0.1] },
            samples: Vec::new(),
            sse: 0.0,
            iterations: 3,
        };
        let json = serde_json::to_string(&FitFile::from_fit(&fit)).unwrap();
        assert!(json.contains("null"));
        let back: FitFile = serde_json::from_str(&json).unwrap();
        assert!(back.into_fit().covariance[1][1].is_infinite());
    }
}
