//! CSV report of rows the importer did not store.

use crate::errors::{AppError, ResultExt};
use crate::validator::SkippedRow;
use csv::Writer;
use std::path::{Path, PathBuf};

pub const SKIP_REPORT_HEADER: [&str; 12] = [
    "Row Number",
    "First Name",
    "Last Name",
    "Designation",
    "Profile Link",
    "Email",
    "Company Name",
    "Company Link",
    "Job Title",
    "Job Link",
    "City or Location",
    "Skip Reason",
];

/// `<dir>/<stem>_skipped.csv` next to the input file.
pub fn default_report_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("leads");
    input.with_file_name(format!("{}_skipped.csv", stem))
}

/// Serializes rejected rows in the order they were rejected.
pub fn render_skip_report(skipped: &[&SkippedRow]) -> Result<String, AppError> {
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_record(SKIP_REPORT_HEADER)?;

    for entry in skipped {
        let row = &entry.row;
        let row_number = entry.row_number().to_string();
        let reason = entry.reason.to_string();
        let record: [&str; 12] = [
            &row_number,
            &row.first_name,
            &row.last_name,
            &row.designation,
            &row.profile_link,
            &row.email,
            &row.company_name,
            &row.company_link,
            &row.job_title,
            &row.job_link,
            &row.location,
            &reason,
        ];
        wtr.write_record(record)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("Failed to flush skip report: {}", e)))?;
    String::from_utf8(data)
        .map_err(|e| AppError::InternalError(format!("Skip report is not UTF-8: {}", e)))
}

/// Writes the report to `path`. Returns `false` without touching the
/// filesystem when nothing was skipped.
pub fn write_skip_report(skipped: &[&SkippedRow], path: &Path) -> Result<bool, AppError> {
    if skipped.is_empty() {
        tracing::info!("No skipped leads to write.");
        return Ok(false);
    }

    let content = render_skip_report(skipped)?;
    std::fs::write(path, content)
        .with_context(|| format!("writing skip report to {}", path.display()))?;
    tracing::info!("Skipped leads written to: {}", path.display());
    Ok(true)
}
