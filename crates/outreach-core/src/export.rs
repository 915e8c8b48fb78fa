//! CSV export of search results.

use std::io;

use thiserror::Error;

use crate::places::SearchResult;

pub const CSV_HEADERS: [&str; 8] = [
    "Place ID", "Name", "Category", "Address", "Rating", "Phone", "Website", "Email",
];

const MISSING: &str = "N/A";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Write `results` as CSV: one header row, then one row per result in order.
///
/// Every field is quoted. Missing values are written as `N/A`; identifier-only
/// results carry nothing but their place ID.
///
/// # Errors
///
/// Returns [`ExportError`] if the underlying writer fails.
pub fn write_results_csv<W: io::Write>(
    writer: W,
    results: &[SearchResult],
) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(CSV_HEADERS)?;
    for result in results {
        csv.write_record(row(result))?;
    }
    csv.flush()?;
    Ok(())
}

fn row(result: &SearchResult) -> [String; 8] {
    let or_missing = |value: Option<&str>| -> String {
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(MISSING)
            .to_string()
    };

    let details = result.details.as_ref();
    [
        result.place_id.to_string(),
        or_missing(details.and_then(|d| d.place_name.as_deref())),
        details
            .and_then(|d| d.category.as_ref())
            .map_or_else(|| MISSING.to_string(), ToString::to_string),
        or_missing(details.and_then(|d| d.address.as_deref())),
        details
            .and_then(|d| d.rating)
            .map_or_else(|| MISSING.to_string(), |r| r.to_string()),
        or_missing(details.and_then(|d| d.phone.as_deref())),
        or_missing(details.and_then(|d| d.website.as_deref())),
        or_missing(details.and_then(|d| d.email.as_deref())),
    ]
}
