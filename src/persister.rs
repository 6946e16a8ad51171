use crate::csv_parser::RawRow;
use crate::store::LeadStore;
use crate::validator::{SkipReason, SkippedRow, ValidatedLead};
use uuid::Uuid;

/// What happened to one parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Lead stored under `id`.
    Created { line: u64, id: Uuid },
    /// Data problem: failed validation or already stored.
    Skipped(SkippedRow),
    /// System problem: the store rejected the write for another reason.
    Failed(SkippedRow),
}

impl RowOutcome {
    pub fn line(&self) -> u64 {
        match self {
            RowOutcome::Created { line, .. } => *line,
            RowOutcome::Skipped(s) | RowOutcome::Failed(s) => s.row_number(),
        }
    }

    /// The rejected row, for anything that did not create a lead.
    pub fn rejection(&self) -> Option<&SkippedRow> {
        match self {
            RowOutcome::Created { .. } => None,
            RowOutcome::Skipped(s) | RowOutcome::Failed(s) => Some(s),
        }
    }
}

/// Writes validated rows to the store on behalf of one owner.
pub struct LeadPersister<'a, S: ?Sized> {
    store: &'a S,
    owner: Uuid,
}

impl<'a, S> LeadPersister<'a, S>
where
    S: LeadStore + ?Sized,
{
    /// `owner` becomes both `assigned_to` and `created_by` of every lead.
    pub fn new(store: &'a S, owner: Uuid) -> Self {
        Self { store, owner }
    }

    /// Creates the lead. A duplicate key becomes a skip; any other store
    /// failure is recorded and never propagated.
    pub async fn persist(&self, row: &RawRow, lead: ValidatedLead) -> RowOutcome {
        let new_lead = lead.into_new_lead(self.owner);

        match self.store.create_lead(&new_lead).await {
            Ok(id) => {
                tracing::info!(
                    "Row {}: Created lead for {} {} at {}",
                    row.line,
                    new_lead.first_name,
                    new_lead.last_name,
                    new_lead.company_name
                );
                RowOutcome::Created { line: row.line, id }
            }
            Err(e) if e.is_conflict() => {
                let reason = SkipReason::Duplicate {
                    email: row.email.clone(),
                    company_name: row.company_name.clone(),
                };
                tracing::warn!("Row {}: Skipping - {}", row.line, reason);
                RowOutcome::Skipped(SkippedRow::new(row.clone(), reason))
            }
            Err(e) => {
                let reason = SkipReason::Error(e.to_string());
                tracing::error!("Row {}: {}", row.line, reason);
                RowOutcome::Failed(SkippedRow::new(row.clone(), reason))
            }
        }
    }
}
