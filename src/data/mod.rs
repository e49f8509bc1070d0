//! Distillation profile sources.
//!
//! Fitting and blending only see `ProfileSource`; the crudemonitor.ca adapter is
//! one implementation of it.

pub mod crudemonitor;
pub mod page;

pub use crudemonitor::CrudeMonitorClient;
pub use page::parse_distillation_page;

use crate::domain::{DistillationProfile, ProfileDate};
use crate::error::AppError;

/// Something that can look up a crude's distillation table.
pub trait ProfileSource {
    /// Fetch the profile for `acronym` on `date`.
    ///
    /// `Ok(None)` means the source has no data (unknown acronym, or nothing
    /// published for that date). That is an expected outcome, not an error.
    fn fetch(&self, acronym: &str, date: &ProfileDate) -> Result<Option<DistillationProfile>, AppError>;
}

/// Validate a request and fetch it from `source`.
///
/// The acronym and date are checked before the source is touched.
pub fn fetch_profile<S: ProfileSource + ?Sized>(
    source: &S,
    acronym: &str,
    date: &str,
) -> Result<Option<DistillationProfile>, AppError> {
    let date = ProfileDate::parse(date)?;
    let acronym = validate_acronym(acronym)?;
    source.fetch(acronym, &date)
}

pub(crate) fn validate_acronym(acronym: &str) -> Result<&str, AppError> {
    let trimmed = acronym.trim();
    if trimmed.is_empty() {
        return Err(AppError::usage("Crude acronym must not be empty."));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::usage(format!(
            "Invalid crude acronym '{acronym}': expected letters and digits only."
        )));
    }
    Ok(trimmed)
}
