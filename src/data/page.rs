//! crudemonitor.ca distillation page parsing.
//!
//! The page is rendered server-side and has a stable shape:
//!
//! ```text
//! <table class="table table-sm table-striped">
//!   <tr id="tableHeadRow"><th>Mass % Recovered</th><th>Temperature( oC )</th>...</tr>
//!   <tr><th>IBP</th><td>34.1</td><td>33.6</td><td>2.1</td></tr>
//!   ...
//! </table>
//! ```
//!
//! When there is nothing to show, the table is replaced by a trailing message.
//! Only this module knows about markup; everything downstream sees
//! `DistillationProfile`.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::domain::{DistillationProfile, ProfileDate, ProfileRow};
use crate::error::AppError;

const UNKNOWN_ACRONYM: &str = "No crudes match the given acronym.";
const NO_SAMPLES: &str = "No distillation samples available.";

const TABLE_SELECTOR: &str = "table.table.table-sm.table-striped";
const HEADER_ROW_ID: &str = "tableHeadRow";

/// Parse a distillation page.
///
/// Returns `Ok(None)` when the page says there is no data for the acronym or
/// date. Unexpected markup is an error.
pub fn parse_distillation_page(
    html: &str,
    acronym: &str,
    date: &ProfileDate,
) -> Result<Option<DistillationProfile>, AppError> {
    let doc = Html::parse_document(html);

    let text: String = doc.root_element().text().collect();
    let tail = text.trim_end();
    if tail.ends_with(UNKNOWN_ACRONYM) {
        warn!(acronym, "no distillation samples available for crude");
        return Ok(None);
    }
    if tail.ends_with(NO_SAMPLES) {
        warn!(acronym, %date, "no distillation samples available for date");
        return Ok(None);
    }

    let table_sel = selector(TABLE_SELECTOR)?;
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;
    let header_cell_sel = selector("th, td")?;

    // The distillation table is the last striped table on the page.
    let table = doc
        .select(&table_sel)
        .last()
        .ok_or_else(|| AppError::failure(format!("No distillation table found for crude '{acronym}'.")))?;

    let header_row = table
        .select(&row_sel)
        .find(|tr| tr.value().id() == Some(HEADER_ROW_ID))
        .ok_or_else(|| AppError::failure("Distillation table has no header row."))?;

    // The first header cell labels the row index ("Mass % Recovered").
    let headers: Vec<String> = header_row
        .select(&header_cell_sel)
        .skip(1)
        .map(|cell| cell_text(&cell))
        .collect();
    let columns = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for tr in table.select(&row_sel) {
        if tr.value().id() == Some(HEADER_ROW_ID) {
            continue;
        }
        let Some(label) = tr.select(&th_sel).last().map(|th| cell_text(&th)) else {
            continue;
        };
        let cells: Vec<String> = tr
            .select(&td_sel)
            .map(|td| cell_text(&td).replace(',', ""))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let value = |idx: usize| -> Result<Option<f64>, AppError> {
            cells.get(idx).map_or(Ok(None), |raw| parse_cell(raw))
        };
        rows.push(ProfileRow {
            mass_fraction: label_fraction(&label)?,
            temperature: value(columns.temperature)?,
            average: value(columns.average)?,
            std_dev: value(columns.std_dev)?,
            label,
        });
    }

    if rows.is_empty() {
        warn!(acronym, %date, "distillation table has no rows");
        return Ok(None);
    }
    debug!(acronym, %date, rows = rows.len(), "parsed distillation table");

    Ok(Some(DistillationProfile {
        acronym: acronym.to_string(),
        date: *date,
        rows,
    }))
}

/// Positions of the temperature columns among the data cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    temperature: usize,
    average: usize,
    std_dev: usize,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self, AppError> {
        let find = |prefix: &str| {
            headers
                .iter()
                .position(|h| normalize_header(h).starts_with(prefix))
                .ok_or_else(|| {
                    AppError::failure(format!(
                        "Distillation table is missing a '{prefix}' column (headers: {headers:?})."
                    ))
                })
        };
        Ok(Self {
            temperature: find("temperature")?,
            average: find("average")?,
            std_dev: find("standarddeviation")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::failure(format!("Invalid selector '{css}': {e}")))
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// `Temperature( oC )` -> `temperatureoc`.
fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// `IBP` is the initial boiling point (nothing recovered yet); other labels are
/// recovered mass percentages.
fn label_fraction(label: &str) -> Result<f64, AppError> {
    if label.eq_ignore_ascii_case("IBP") {
        return Ok(0.0);
    }
    let pct: f64 = label
        .trim_end_matches('%')
        .trim()
        .parse()
        .map_err(|_| AppError::failure(format!("Unexpected distillation row label '{label}'.")))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(AppError::failure(format!("Recovered percentage out of range: '{label}'.")));
    }
    Ok(pct / 100.0)
}

/// `-` and empty cells are missing values.
fn parse_cell(raw: &str) -> Result<Option<f64>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(None);
    }
    let v: f64 = trimmed
        .parse()
        .map_err(|_| AppError::failure(format!("Unexpected distillation table value '{raw}'.")))?;
    Ok(v.is_finite().then_some(v))
}
