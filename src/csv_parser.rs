//! Lead CSV reader.
//!
//! Columns are located by case-insensitive substring match on the header, so
//! exports from different tools ("First Name", "Contact First Name", ...) load
//! without a mapping file. Quoting follows RFC 4180 via the `csv` crate, the
//! same codec the skip report is written with. Padding before an opening quote
//! (`Ada, "Acme, Inc."`) is stripped first so the quote still opens the field.

use crate::errors::AppError;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

/// The semantic columns a lead file can carry, in header-matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadColumn {
    FirstName,
    LastName,
    Designation,
    ProfileLink,
    Email,
    CompanyName,
    CompanyLink,
    JobTitle,
    JobLink,
    Location,
}

impl LeadColumn {
    pub const ALL: [LeadColumn; 10] = [
        LeadColumn::FirstName,
        LeadColumn::LastName,
        LeadColumn::Designation,
        LeadColumn::ProfileLink,
        LeadColumn::Email,
        LeadColumn::CompanyName,
        LeadColumn::CompanyLink,
        LeadColumn::JobTitle,
        LeadColumn::JobLink,
        LeadColumn::Location,
    ];

    /// Lowercase fragments that identify this column in a header cell.
    fn patterns(self) -> &'static [&'static str] {
        match self {
            LeadColumn::FirstName => &["first name"],
            LeadColumn::LastName => &["last name"],
            LeadColumn::Designation => &["designation"],
            LeadColumn::ProfileLink => &["profile link"],
            LeadColumn::Email => &["email"],
            LeadColumn::CompanyName => &["company name"],
            LeadColumn::CompanyLink => &["company link"],
            LeadColumn::JobTitle => &["job title"],
            LeadColumn::JobLink => &["job link"],
            LeadColumn::Location => &["city", "location"],
        }
    }

    fn matches(self, normalized_header: &str) -> bool {
        self.patterns()
            .iter()
            .any(|p| normalized_header.contains(p))
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Column positions resolved from the header line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    positions: [Option<usize>; 10],
}

impl HeaderMap {
    /// Resolves each header cell to at most one column. A column keeps the
    /// first cell that matched it; later cells with the same fragment are ignored.
    pub fn from_header<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = HeaderMap::default();
        for (index, cell) in cells.into_iter().enumerate() {
            let normalized = cell.trim().to_lowercase();
            let Some(column) = LeadColumn::ALL.into_iter().find(|c| c.matches(&normalized)) else {
                continue;
            };
            let slot = &mut map.positions[column.slot()];
            if slot.is_none() {
                *slot = Some(index);
            }
        }
        map
    }

    pub fn position(&self, column: LeadColumn) -> Option<usize> {
        self.positions[column.slot()]
    }

    /// Columns the header did not provide; their values read as empty.
    pub fn missing(&self) -> Vec<LeadColumn> {
        LeadColumn::ALL
            .into_iter()
            .filter(|c| self.position(*c).is_none())
            .collect()
    }
}

/// One data line, mapped onto the lead columns. Absent cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRow {
    /// 1-based physical line in the source file (the header is line 1).
    ///
    /// Blank lines and dropped empty rows still count, so this can be larger
    /// than "data row index + 2" in files containing them.
    pub line: u64,
    pub first_name: String,
    pub last_name: String,
    pub designation: String,
    pub profile_link: String,
    pub email: String,
    pub company_name: String,
    pub company_link: String,
    pub job_title: String,
    pub job_link: String,
    pub location: String,
}

impl RawRow {
    pub fn get(&self, column: LeadColumn) -> &str {
        match column {
            LeadColumn::FirstName => &self.first_name,
            LeadColumn::LastName => &self.last_name,
            LeadColumn::Designation => &self.designation,
            LeadColumn::ProfileLink => &self.profile_link,
            LeadColumn::Email => &self.email,
            LeadColumn::CompanyName => &self.company_name,
            LeadColumn::CompanyLink => &self.company_link,
            LeadColumn::JobTitle => &self.job_title,
            LeadColumn::JobLink => &self.job_link,
            LeadColumn::Location => &self.location,
        }
    }

    fn get_mut(&mut self, column: LeadColumn) -> &mut String {
        match column {
            LeadColumn::FirstName => &mut self.first_name,
            LeadColumn::LastName => &mut self.last_name,
            LeadColumn::Designation => &mut self.designation,
            LeadColumn::ProfileLink => &mut self.profile_link,
            LeadColumn::Email => &mut self.email,
            LeadColumn::CompanyName => &mut self.company_name,
            LeadColumn::CompanyLink => &mut self.company_link,
            LeadColumn::JobTitle => &mut self.job_title,
            LeadColumn::JobLink => &mut self.job_link,
            LeadColumn::Location => &mut self.location,
        }
    }

    /// True when every mapped field is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        LeadColumn::ALL
            .into_iter()
            .all(|c| self.get(c).trim().is_empty())
    }

    fn from_record(record: &StringRecord, header: &HeaderMap, line: u64) -> Self {
        let mut row = RawRow {
            line,
            ..RawRow::default()
        };
        for column in LeadColumn::ALL {
            if let Some(value) = header.position(column).and_then(|i| record.get(i)) {
                *row.get_mut(column) = value.trim().to_string();
            }
        }
        row
    }
}

/// A line holding nothing but whitespace.
fn is_blank_line(record: &StringRecord) -> bool {
    record.len() <= 1 && record.get(0).map_or(true, |v| v.trim().is_empty())
}

/// Removes spaces and tabs at the start of each unquoted field. The `csv`
/// reader only honours a quote as the first byte of a field, and trimming
/// happens after parsing. Line breaks are kept so record positions still
/// match the source file.
fn strip_field_padding(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_quotes = false;
    let mut field_start = true;

    for ch in text.chars() {
        if in_quotes {
            if ch == '"' {
                in_quotes = false;
            }
            out.push(ch);
            continue;
        }
        match ch {
            ' ' | '\t' if field_start => continue,
            '"' => in_quotes = true,
            ',' | '\n' | '\r' => {
                out.push(ch);
                field_start = true;
                continue;
            }
            _ => {}
        }
        field_start = false;
        out.push(ch);
    }
    out
}

/// Parses a whole lead file into rows, in file order.
///
/// Blank lines are ignored. Rows whose mapped fields are all empty are
/// dropped. Fails with [`AppError::Format`] when the file lacks a header
/// or has no data line after it.
pub fn parse_leads_csv(text: &str) -> Result<Vec<RawRow>, AppError> {
    let text = strip_field_padding(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut header: Option<HeaderMap> = None;
    let mut data_lines = 0usize;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        if is_blank_line(&record) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());

        let Some(map) = header.as_ref() else {
            let map = HeaderMap::from_header(record.iter());
            let missing = map.missing();
            if !missing.is_empty() {
                tracing::debug!("Header has no column for {:?}; values default to empty", missing);
            }
            header = Some(map);
            continue;
        };

        data_lines += 1;
        let row = RawRow::from_record(&record, map, line);
        if row.is_blank() {
            tracing::debug!("Line {}: no data in mapped columns, dropped", line);
            continue;
        }
        rows.push(row);
    }

    if header.is_none() || data_lines == 0 {
        return Err(AppError::Format(
            "CSV file must have at least a header and one data row".to_string(),
        ));
    }

    Ok(rows)
}
