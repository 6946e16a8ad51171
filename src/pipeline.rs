//! End-to-end CSV import: parse, validate, persist, report.
//!
//! Rows are handled strictly one after another; each store call is awaited
//! before the next row starts, so outcomes are in file order.

use crate::csv_parser::parse_leads_csv;
use crate::errors::{AppError, ResultExt};
use crate::persister::{LeadPersister, RowOutcome};
use crate::skip_report::write_skip_report;
use crate::store::LeadStore;
use crate::validator::{validate_row, SkippedRow};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Counts derived from a run's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub processed: usize,
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ImportSummary {
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        outcomes.iter().fold(
            ImportSummary {
                processed: outcomes.len(),
                ..Default::default()
            },
            |mut acc, outcome| {
                match outcome {
                    RowOutcome::Created { .. } => acc.created += 1,
                    RowOutcome::Skipped(_) => acc.skipped += 1,
                    RowOutcome::Failed(_) => acc.errors += 1,
                }
                acc
            },
        )
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Import Summary ===")?;
        writeln!(f, "Total rows processed: {}", self.processed)?;
        writeln!(f, "Leads created: {}", self.created)?;
        writeln!(f, "Leads skipped: {}", self.skipped)?;
        write!(f, "Errors: {}", self.errors)
    }
}

/// Per-row outcomes of one run, in file order.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub outcomes: Vec<RowOutcome>,
}

impl ImportReport {
    pub fn summary(&self) -> ImportSummary {
        ImportSummary::from_outcomes(&self.outcomes)
    }

    /// Skipped and failed rows, in the order they were rejected.
    pub fn rejected(&self) -> Vec<&SkippedRow> {
        self.outcomes.iter().filter_map(RowOutcome::rejection).collect()
    }

    pub fn created_ids(&self) -> Vec<Uuid> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RowOutcome::Created { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Writes the skip report if any row was rejected.
    pub fn write_skip_report(&self, path: &Path) -> Result<bool, AppError> {
        write_skip_report(&self.rejected(), path)
    }
}

/// Imports lead files into a store, assigning every lead to one user.
pub struct ImportPipeline<'a, S: ?Sized> {
    store: &'a S,
    default_assignee: Uuid,
}

impl<'a, S> ImportPipeline<'a, S>
where
    S: LeadStore + ?Sized,
{
    pub fn new(store: &'a S, default_assignee: Uuid) -> Self {
        Self {
            store,
            default_assignee,
        }
    }

    pub fn default_assignee(&self) -> Uuid {
        self.default_assignee
    }

    /// Reads the whole file and imports it. Unreadable files and malformed
    /// CSV fail the run; row-level problems never do.
    pub async fn run_file(&self, path: &Path) -> Result<ImportReport, AppError> {
        tracing::info!("Reading CSV file from: {}", path.display());
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        self.run(&text).await
    }

    pub async fn run(&self, text: &str) -> Result<ImportReport, AppError> {
        let rows = parse_leads_csv(text)?;
        tracing::info!("Found {} rows in CSV", rows.len());

        let persister = LeadPersister::new(self.store, self.default_assignee);
        let mut outcomes = Vec::with_capacity(rows.len());

        for row in &rows {
            let outcome = match validate_row(row) {
                Ok(lead) => persister.persist(row, lead).await,
                Err(skipped) => {
                    tracing::warn!("Row {}: Skipping - {}", row.line, skipped.reason);
                    RowOutcome::Skipped(skipped)
                }
            };
            outcomes.push(outcome);
        }

        let report = ImportReport { outcomes };
        let summary = report.summary();
        tracing::info!(
            processed = summary.processed,
            created = summary.created,
            skipped = summary.skipped,
            errors = summary.errors,
            "Import finished"
        );

        Ok(report)
    }
}
