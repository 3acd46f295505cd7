use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Confidence, ScanResult, ScanStatus};

/// One flat CSV line per result.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    source_file: &'a str,
    row_index: usize,
    package: &'a str,
    version: &'a str,
    product: &'a str,
    cycle: &'a str,
    confidence: Confidence,
    status: ScanStatus,
    eol_date: Option<NaiveDate>,
    latest: &'a str,
    release_date: Option<NaiveDate>,
    lts: bool,
    detail: &'a str,
}

const HEADERS: [&str; 13] = [
    "source_file",
    "row_index",
    "package",
    "version",
    "product",
    "cycle",
    "confidence",
    "status",
    "eol_date",
    "latest",
    "release_date",
    "lts",
    "detail",
];

impl<'a> From<&'a ScanResult> for CsvRow<'a> {
    fn from(r: &'a ScanResult) -> Self {
        CsvRow {
            source_file: &r.source_file,
            row_index: r.record.row_index,
            package: &r.record.raw_name,
            version: &r.record.raw_version,
            product: r.product.as_deref().unwrap_or(""),
            cycle: r.cycle.as_deref().unwrap_or(""),
            confidence: r.confidence,
            status: r.status,
            eol_date: r.eol_date,
            latest: r.latest.as_deref().unwrap_or(""),
            release_date: r.release_date,
            lts: r.lts,
            detail: &r.detail,
        }
    }
}

/// Write results as CSV. The header is written even when there are no rows.
pub fn write_csv<'a, I>(path: &Path, results: I) -> Result<()>
where
    I: IntoIterator<Item = &'a ScanResult>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(HEADERS)?;
    for result in results {
        writer.serialize(CsvRow::from(result))?;
    }
    writer.flush()?;
    Ok(())
}
