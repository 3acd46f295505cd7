//! Report renderers for scan results.
//!
//! - [`json`]: summary and full per-row results as pretty JSON.
//! - [`csv_export`]: flat CSV of every row, plus an EOL-only CSV.
//! - [`html`]: standalone HTML page with status-coloured rows.
//! - [`terminal`]: colored summary box and tables; respects `--verbose` / `--quiet`.

pub mod csv_export;
pub mod html;
pub mod json;
pub mod terminal;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::models::{ScanResult, ScanStatus};
use crate::scan::ScanSummary;

/// Files written for one scanned input.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub summary: PathBuf,
    pub detailed: PathBuf,
    pub csv: PathBuf,
    pub eol_csv: PathBuf,
    pub html: PathBuf,
}

impl ReportPaths {
    pub fn all(&self) -> [&Path; 5] {
        [
            self.summary.as_path(),
            self.detailed.as_path(),
            self.csv.as_path(),
            self.eol_csv.as_path(),
            self.html.as_path(),
        ]
    }
}

/// Timestamp used in report file names, e.g. `20250115_093000`.
pub fn timestamp_slug(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Write every file report for one input into `out_dir`, creating it if needed.
pub fn write_reports(
    results: &[ScanResult],
    summary: &ScanSummary,
    out_dir: &Path,
    timestamp: &str,
) -> Result<ReportPaths> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output dir {}", out_dir.display()))?;

    let paths = ReportPaths {
        summary: out_dir.join(format!("summary_{timestamp}.json")),
        detailed: out_dir.join(format!("detailed_results_{timestamp}.json")),
        csv: out_dir.join(format!("eol_report_{timestamp}.csv")),
        eol_csv: out_dir.join(format!("eol_packages_{timestamp}.csv")),
        html: out_dir.join(format!("eol_report_{timestamp}.html")),
    };

    json::write_json(&paths.summary, summary)?;
    json::write_json(&paths.detailed, &results)?;
    csv_export::write_csv(&paths.csv, results.iter())?;
    csv_export::write_csv(
        &paths.eol_csv,
        results.iter().filter(|r| r.status == ScanStatus::Eol),
    )?;
    fs::write(&paths.html, html::render(results, summary))
        .with_context(|| format!("Failed to write {}", paths.html.display()))?;

    for path in paths.all() {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(paths)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_timestamp_slug() {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap();
        assert_eq!(timestamp_slug(&at), "20250115_093005");
    }

    #[test]
    fn test_write_reports_creates_every_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");
        let (results, summary) = fixtures::sample();

        let paths = write_reports(&results, &summary, &out, "20250115_093005").unwrap();
        for path in paths.all() {
            assert!(path.exists(), "{} missing", path.display());
        }
        assert!(paths.html.ends_with("eol_report_20250115_093005.html"));

        let eol_only = fs::read_to_string(&paths.eol_csv).unwrap();
        assert_eq!(eol_only.lines().count(), 2);
        assert!(eol_only.contains("python"));
    }

    #[test]
    fn test_eol_csv_written_even_when_empty() {
        let dir = TempDir::new().unwrap();
        let (mut results, _) = fixtures::sample();
        results.retain(|r| r.status != ScanStatus::Eol);
        let summary = crate::scan::summarize(
            &results,
            0,
            "packages.csv",
            Local::now(),
            Default::default(),
        );

        let paths = write_reports(&results, &summary, dir.path(), "ts").unwrap();
        let eol_only = fs::read_to_string(&paths.eol_csv).unwrap();
        assert_eq!(eol_only.lines().count(), 1);
    }
}
