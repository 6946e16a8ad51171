//! Required-field policy for imported rows.

use crate::csv_parser::RawRow;
use crate::models::{NewLead, CSV_IMPORT_SOURCE};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Placeholder stored when a row has no last name.
pub const MISSING_LAST_NAME: &str = "N/A";

/// Fields a row must carry, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequiredField {
    FirstName,
    Email,
    CompanyName,
    Designation,
}

impl RequiredField {
    pub const CHECK_ORDER: [RequiredField; 4] = [
        RequiredField::FirstName,
        RequiredField::Email,
        RequiredField::CompanyName,
        RequiredField::Designation,
    ];

    fn value(self, row: &RawRow) -> &str {
        match self {
            RequiredField::FirstName => &row.first_name,
            RequiredField::Email => &row.email,
            RequiredField::CompanyName => &row.company_name,
            RequiredField::Designation => &row.designation,
        }
    }

    fn label(self) -> &'static str {
        match self {
            RequiredField::FirstName => "first name",
            RequiredField::Email => "email",
            RequiredField::CompanyName => "company name",
            RequiredField::Designation => "designation",
        }
    }
}

/// Why a row did not become a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Missing(RequiredField),
    /// Rejected by the store's uniqueness constraint; values as they appeared in the file.
    Duplicate { email: String, company_name: String },
    /// Any other persistence failure.
    Error(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Missing(field) => write!(f, "Missing {}", field.label()),
            SkipReason::Duplicate {
                email,
                company_name,
            } => write!(f, "Duplicate lead ({} at {})", email, company_name),
            SkipReason::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// A rejected row kept for the skip report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: RawRow,
    pub reason: SkipReason,
}

impl SkippedRow {
    pub fn new(row: RawRow, reason: SkipReason) -> Self {
        Self { row, reason }
    }

    /// 1-based line of the row in the source file.
    pub fn row_number(&self) -> u64 {
        self.row.line
    }
}

/// A row that passed validation, normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLead {
    pub first_name: String,
    pub last_name: String,
    pub designation: String,
    pub profile_link: Option<String>,
    pub email: String,
    pub location: Option<String>,
    pub company_name: String,
    pub company_link: Option<String>,
    pub job_title: Option<String>,
    pub job_link: Option<String>,
    pub source: String,
}

impl ValidatedLead {
    /// Insert payload with the given user as both assignee and creator.
    pub fn into_new_lead(self, owner: Uuid) -> NewLead {
        NewLead {
            first_name: self.first_name,
            last_name: self.last_name,
            designation: self.designation,
            profile_link: self.profile_link,
            email: self.email,
            location: self.location,
            company_name: self.company_name,
            company_link: self.company_link,
            job_title: self.job_title,
            job_link: self.job_link,
            source: Some(self.source),
            assigned_to: owner,
            created_by: owner,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Checks required fields (first failure wins) and normalizes the row.
///
/// Duplicates are not detected here; the store's unique index decides that.
pub fn validate_row(row: &RawRow) -> Result<ValidatedLead, SkippedRow> {
    if let Some(field) = RequiredField::CHECK_ORDER
        .into_iter()
        .find(|f| f.value(row).trim().is_empty())
    {
        return Err(SkippedRow::new(row.clone(), SkipReason::Missing(field)));
    }

    let last_name = row.last_name.trim();

    Ok(ValidatedLead {
        first_name: row.first_name.trim().to_string(),
        last_name: if last_name.is_empty() {
            MISSING_LAST_NAME.to_string()
        } else {
            last_name.to_string()
        },
        designation: row.designation.trim().to_string(),
        profile_link: optional(&row.profile_link),
        email: row.email.trim().to_lowercase(),
        location: optional(&row.location),
        company_name: row.company_name.trim().to_lowercase(),
        company_link: optional(&row.company_link),
        job_title: optional(&row.job_title),
        job_link: optional(&row.job_link),
        source: CSV_IMPORT_SOURCE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_row() -> RawRow {
        RawRow {
            line: 2,
            first_name: " Ada ".into(),
            last_name: "Lovelace".into(),
            designation: "CTO".into(),
            profile_link: "".into(),
            email: "Ada@Example.COM".into(),
            company_name: "Acme Corp".into(),
            company_link: "https://acme.test".into(),
            job_title: "  ".into(),
            job_link: "".into(),
            location: "London".into(),
        }
    }

    #[test]
    fn normalizes_a_complete_row() {
        let lead = validate_row(&complete_row()).unwrap();
        assert_eq!(lead.first_name, "Ada");
        assert_eq!(lead.email, "ada@example.com");
        assert_eq!(lead.company_name, "acme corp");
        assert_eq!(lead.profile_link, None);
        assert_eq!(lead.job_title, None);
        assert_eq!(lead.company_link.as_deref(), Some("https://acme.test"));
        assert_eq!(lead.location.as_deref(), Some("London"));
        assert_eq!(lead.source, "CSV Import");
    }

    #[test]
    fn blank_last_name_becomes_placeholder() {
        let mut row = complete_row();
        row.last_name = "   ".into();
        assert_eq!(validate_row(&row).unwrap().last_name, "N/A");
    }

    #[test]
    fn first_missing_field_in_check_order_is_reported() {
        let mut row = complete_row();
        row.first_name.clear();
        row.email.clear();
        let skipped = validate_row(&row).unwrap_err();
        assert_eq!(skipped.reason.to_string(), "Missing first name");
        assert_eq!(skipped.row_number(), 2);

        let mut row = complete_row();
        row.designation.clear();
        row.company_name = " ".into();
        assert_eq!(
            validate_row(&row).unwrap_err().reason.to_string(),
            "Missing company name"
        );

        let mut row = complete_row();
        row.designation.clear();
        assert_eq!(
            validate_row(&row).unwrap_err().reason.to_string(),
            "Missing designation"
        );

        let mut row = complete_row();
        row.email = "\t".into();
        assert_eq!(
            validate_row(&row).unwrap_err().reason,
            SkipReason::Missing(RequiredField::Email)
        );
    }

    #[test]
    fn skip_reason_messages() {
        let dup = SkipReason::Duplicate {
            email: "Ada@Example.com".into(),
            company_name: "Acme".into(),
        };
        assert_eq!(dup.to_string(), "Duplicate lead (Ada@Example.com at Acme)");
        assert_eq!(
            SkipReason::Error("connection reset".into()).to_string(),
            "Error: connection reset"
        );
    }

    #[test]
    fn new_lead_uses_owner_for_both_references() {
        let owner = Uuid::new_v4();
        let lead = validate_row(&complete_row()).unwrap().into_new_lead(owner);
        assert_eq!(lead.assigned_to, owner);
        assert_eq!(lead.created_by, owner);
        assert_eq!(lead.source.as_deref(), Some("CSV Import"));
    }
}
