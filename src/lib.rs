//! Leads Hub importer library
//!
//! Loads prospective-contact ("lead") CSV files into the Leads Hub database,
//! reports the rows it could not store, and exports stored leads back to CSV.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `csv_parser`: Header-mapped lead CSV reader.
//! - `data`: Data access layer.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Postgres lead/user storage.
//! - `errors`: Error handling types.
//! - `export`: Lead filtering and CSV export.
//! - `identity`: Default assignee resolution.
//! - `models`: Core data models.
//! - `persister`: Per-row lead creation.
//! - `pipeline`: Import orchestration and summaries.
//! - `skip_report`: Rejected-row CSV report.
//! - `store`: Persistence trait and in-memory store.
//! - `validator`: Required-field checks and normalization.

pub mod data;

pub mod config;
pub mod csv_parser;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod export;
pub mod identity;
pub mod models;
pub mod persister;
pub mod pipeline;
pub mod skip_report;
pub mod store;
pub mod validator;
