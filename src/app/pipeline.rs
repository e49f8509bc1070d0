//! Shared fetch -> fit -> blend workflow.
//!
//! The CLI calls into these functions and only deals with presentation.
//! Everything here is generic over `ProfileSource`, so tests run against
//! in-memory profiles.

use tracing::warn;

use crate::blend::blend_fits;
use crate::data::{ProfileSource, fetch_profile, validate_acronym};
use crate::domain::{DistillationProfile, FitResult, MixtureBlend, MixtureRequest, ProfileDate};
use crate::error::AppError;
use crate::fit::fit_profile;
use crate::plot::{Figure, render_blend_svg};

/// A fetched profile and its fit.
#[derive(Debug, Clone)]
pub struct FitOutput {
    pub profile: DistillationProfile,
    pub fit: FitResult,
}

/// A finished blend plus its figure.
#[derive(Debug, Clone)]
pub struct BlendOutput {
    pub blend: MixtureBlend,
    pub figure: Figure,
}

/// Fetch one crude and fit it, keeping the raw profile.
pub fn run_fit<S: ProfileSource + ?Sized>(
    source: &S,
    acronym: &str,
    date: &str,
) -> Result<Option<FitOutput>, AppError> {
    let Some(profile) = fetch_profile(source, acronym, date)? else {
        return Ok(None);
    };
    let Some(fit) = fit_profile(&profile)? else {
        return Ok(None);
    };
    Ok(Some(FitOutput { profile, fit }))
}

/// Fetch one crude and fit it.
pub fn fit_crude<S: ProfileSource + ?Sized>(
    source: &S,
    acronym: &str,
    date: &str,
) -> Result<Option<FitResult>, AppError> {
    Ok(run_fit(source, acronym, date)?.map(|out| out.fit))
}

/// Fetch and fit both crudes of `request`, then blend them.
///
/// Crude 2 is never fetched when crude 1 has no usable profile.
pub fn blend_crudes<S: ProfileSource + ?Sized>(
    source: &S,
    request: &MixtureRequest,
) -> Result<Option<MixtureBlend>, AppError> {
    validate_acronym(&request.crude1)?;
    validate_acronym(&request.crude2)?;
    let date = request.date.as_query();

    let Some(fit1) = fit_crude(source, &request.crude1, &date)? else {
        warn!(crude = %request.crude1, "blend aborted: first crude has no profile");
        return Ok(None);
    };
    let Some(fit2) = fit_crude(source, &request.crude2, &date)? else {
        warn!(crude = %request.crude2, "blend aborted: second crude has no profile");
        return Ok(None);
    };

    blend_fits(request, fit1, fit2).map(Some)
}

/// Blend `vol1` of `crude1` with `vol2` of `crude2` and render the result.
///
/// Volumes, date and acronyms are validated before anything is fetched.
pub fn blend<S: ProfileSource + ?Sized>(
    source: &S,
    crude1: &str,
    crude2: &str,
    vol1: f64,
    vol2: f64,
    date: &str,
) -> Result<Option<BlendOutput>, AppError> {
    let request = MixtureRequest::new(crude1.trim(), crude2.trim(), vol1, vol2)?
        .with_date(ProfileDate::parse(date)?);

    let Some(blend) = blend_crudes(source, &request)? else {
        return Ok(None);
    };
    let figure = render_blend_svg(&blend)?;
    Ok(Some(BlendOutput { blend, figure }))
}
