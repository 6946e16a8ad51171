//! Filtered lead queries and CSV export.

use crate::errors::AppError;
use crate::models::Lead;
use chrono::{NaiveDate, NaiveTime};
use csv::Writer;
use regex::Regex;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Which leads a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadScope {
    /// Administrators see every lead.
    #[default]
    All,
    /// Regular users only see leads assigned to them.
    AssignedTo(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    FirstName,
    LastName,
    Email,
    CompanyName,
    Designation,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::FirstName => "first_name",
            SortField::LastName => "last_name",
            SortField::Email => "email",
            SortField::CompanyName => "company_name",
            SortField::Designation => "designation",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "first_name" => Ok(SortField::FirstName),
            "last_name" => Ok(SortField::LastName),
            "email" => Ok(SortField::Email),
            "company_name" => Ok(SortField::CompanyName),
            "designation" => Ok(SortField::Designation),
            other => Err(AppError::BadRequest(format!("Unknown sort field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::BadRequest(format!("Unknown sort order: {}", other))),
        }
    }
}

/// Optional criteria for listing leads. Text filters are case-insensitive
/// regular expressions.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub scope: LeadScope,
    /// Matched against first name, last name, email, company name and job title.
    pub search: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub designation: Option<String>,
    pub source: Option<String>,
    /// Honoured only for [`LeadScope::All`].
    pub assigned_to: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    /// Inclusive: covers the whole day.
    pub date_to: Option<NaiveDate>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub limit: Option<i64>,
}

const SEARCH_COLUMNS: [&str; 5] = ["first_name", "last_name", "email", "company_name", "job_title"];

fn pattern(value: &Option<String>) -> Result<Option<&str>, AppError> {
    let Some(raw) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    Regex::new(raw).map_err(|e| AppError::BadRequest(format!("Invalid filter pattern '{}': {}", raw, e)))?;
    Ok(Some(raw))
}

impl LeadFilter {
    /// Appends `WHERE ... ORDER BY ... [LIMIT]` for this filter.
    pub fn push_clauses<'q>(&'q self, qb: &mut QueryBuilder<'q, Postgres>) -> Result<(), AppError> {
        let mut has_where = false;
        let mut next = |qb: &mut QueryBuilder<'q, Postgres>| {
            qb.push(if has_where { " AND " } else { " WHERE " });
            has_where = true;
        };

        match self.scope {
            LeadScope::AssignedTo(user) => {
                next(qb);
                qb.push("assigned_to = ").push_bind(user);
            }
            LeadScope::All => {
                if let Some(user) = self.assigned_to {
                    next(qb);
                    qb.push("assigned_to = ").push_bind(user);
                }
            }
        }

        if let Some(search) = pattern(&self.search)? {
            next(qb);
            qb.push("(");
            for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" ~* ").push_bind(search);
            }
            qb.push(")");
        }

        for (column, value) in [
            ("company_name", &self.company),
            ("location", &self.location),
            ("designation", &self.designation),
            ("source", &self.source),
        ] {
            if let Some(p) = pattern(value)? {
                next(qb);
                qb.push(column).push(" ~* ").push_bind(p);
            }
        }

        if let Some(from) = self.date_from {
            next(qb);
            qb.push("created_at >= ")
                .push_bind(from.and_time(NaiveTime::MIN).and_utc());
        }
        if let Some(to) = self.date_to {
            let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                .ok_or_else(|| AppError::InternalError("invalid end-of-day time".to_string()))?;
            next(qb);
            qb.push("created_at <= ").push_bind(to.and_time(end_of_day).and_utc());
        }

        qb.push(" ORDER BY ")
            .push(self.sort_by.column())
            .push(match self.sort_order {
                SortOrder::Asc => " ASC",
                SortOrder::Desc => " DESC",
            });

        if let Some(limit) = self.limit {
            if limit < 1 {
                return Err(AppError::BadRequest("limit must be at least 1".to_string()));
            }
            qb.push(" LIMIT ").push_bind(limit);
        }

        Ok(())
    }

    fn select_query(&self) -> Result<QueryBuilder<'_, Postgres>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM leads");
        self.push_clauses(&mut qb)?;
        Ok(qb)
    }
}

/// Fetches leads matching `filter`.
pub async fn list_leads(pool: &PgPool, filter: &LeadFilter) -> Result<Vec<Lead>, AppError> {
    let mut qb = filter.select_query()?;
    let leads = qb.build_query_as::<Lead>().fetch_all(pool).await?;
    tracing::debug!("Fetched {} leads for export", leads.len());
    Ok(leads)
}

/// Header of exported files. Every importer column is present, so an export
/// can be loaded back.
pub const EXPORT_HEADER: [&str; 14] = [
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
    "Source",
    "Assigned To",
    "Created By",
    "Created At",
];

pub fn render_leads_csv(leads: &[Lead]) -> Result<String, AppError> {
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_record(EXPORT_HEADER)?;

    for lead in leads {
        wtr.write_record([
            lead.first_name.clone(),
            lead.last_name.clone(),
            lead.designation.clone(),
            lead.profile_link.clone().unwrap_or_default(),
            lead.email.clone(),
            lead.company_name.clone(),
            lead.company_link.clone().unwrap_or_default(),
            lead.job_title.clone().unwrap_or_default(),
            lead.job_link.clone().unwrap_or_default(),
            lead.location.clone().unwrap_or_default(),
            lead.source.clone().unwrap_or_default(),
            lead.assigned_to.to_string(),
            lead.created_by.to_string(),
            lead.created_at.to_rfc3339(),
        ])?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("Failed to flush export: {}", e)))?;
    String::from_utf8(data).map_err(|e| AppError::InternalError(format!("Export is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(filter: &LeadFilter) -> String {
        filter.select_query().unwrap().sql().to_string()
    }

    #[test]
    fn empty_filter_sorts_newest_first() {
        assert_eq!(
            sql(&LeadFilter::default()),
            "SELECT * FROM leads ORDER BY created_at DESC"
        );
    }

    #[test]
    fn user_scope_overrides_assigned_to() {
        let filter = LeadFilter {
            scope: LeadScope::AssignedTo(Uuid::new_v4()),
            assigned_to: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert_eq!(
            sql(&filter),
            "SELECT * FROM leads WHERE assigned_to = $1 ORDER BY created_at DESC"
        );
    }

    #[test]
    fn search_spans_name_email_company_and_title() {
        let filter = LeadFilter {
            search: Some("acme".into()),
            company: Some("  ".into()),
            location: Some("London".into()),
            sort_by: SortField::CompanyName,
            sort_order: SortOrder::Asc,
            limit: Some(50),
            ..Default::default()
        };
        assert_eq!(
            sql(&filter),
            "SELECT * FROM leads WHERE (first_name ~* $1 OR last_name ~* $2 OR email ~* $3 \
             OR company_name ~* $4 OR job_title ~* $5) AND location ~* $6 \
             ORDER BY company_name ASC LIMIT $7"
        );
    }

    #[test]
    fn date_range_bounds_creation_time() {
        let filter = LeadFilter {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        };
        assert_eq!(
            sql(&filter),
            "SELECT * FROM leads WHERE created_at >= $1 AND created_at <= $2 ORDER BY created_at DESC"
        );
    }

    #[test]
    fn invalid_patterns_and_limits_are_rejected() {
        let bad_regex = LeadFilter {
            designation: Some("(unclosed".into()),
            ..Default::default()
        };
        assert!(matches!(bad_regex.select_query(), Err(AppError::BadRequest(_))));

        let bad_limit = LeadFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert!(matches!(bad_limit.select_query(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn sort_options_parse() {
        assert_eq!("company_name".parse::<SortField>().unwrap(), SortField::CompanyName);
        assert!("password".parse::<SortField>().is_err());
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    }
}
