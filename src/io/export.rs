//! Export the mixture table to CSV.
//!
//! One row per target fraction, in report order, so the file can be dropped
//! into a spreadsheet next to the published crude tables.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::MixtureBlend;
use crate::error::AppError;

/// Write the mixture table to a CSV file.
pub fn write_mixture_csv(path: &Path, blend: &MixtureBlend) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_mixture_csv_to(file, blend)
}

/// Write the mixture table as CSV to any writer.
pub fn write_mixture_csv_to<W: Write>(mut out: W, blend: &MixtureBlend) -> Result<(), AppError> {
    let req = &blend.request;

    writeln!(out, "crude1,crude2,vol1,vol2,date,mass_fraction,temperature_c")
        .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for p in &blend.profile.points {
        writeln!(
            out,
            "{},{},{},{},{},{},{:.4}",
            req.crude1, req.crude2, req.vol1, req.vol2, req.date, p.mass_fraction, p.temperature,
        )
        .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
