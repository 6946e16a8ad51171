//! Exports stored leads to CSV, with the same filters as the lead list.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use leads_hub::config::Config;
use leads_hub::db::Database;
use leads_hub::db_storage::PgLeadStore;
use leads_hub::errors::AppError;
use leads_hub::export::{list_leads, render_leads_csv, LeadFilter, LeadScope, SortField, SortOrder};
use leads_hub::store::LeadStore;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "export-leads", version)]
struct Cli {
    /// Export as this user: admins see everything, others only their own leads.
    #[arg(long = "as-user")]
    as_user: Option<Uuid>,

    /// Case-insensitive pattern over name, email, company and job title.
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    designation: Option<String>,
    #[arg(long)]
    source: Option<String>,

    /// Only leads assigned to this user (admin scope only).
    #[arg(long)]
    assigned_to: Option<Uuid>,

    /// Created on or after this date (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Created on or before this date (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long, default_value = "created_at")]
    sort_by: String,
    #[arg(long, default_value = "desc")]
    sort_order: String,
    #[arg(long)]
    limit: Option<i64>,

    /// Output file; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

async fn scope_for(store: &PgLeadStore, user: Option<Uuid>) -> Result<LeadScope, AppError> {
    let Some(id) = user else {
        return Ok(LeadScope::All);
    };
    let user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", id)))?;
    Ok(if user.is_admin() {
        LeadScope::All
    } else {
        LeadScope::AssignedTo(user.id)
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leads_hub=info,sqlx=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let db = Database::new(&config.database_url, config.db_max_connections).await?;
    let store = PgLeadStore::new(db.pool.clone());

    let result = async {
        let filter = LeadFilter {
            scope: scope_for(&store, cli.as_user).await?,
            search: cli.search.clone(),
            company: cli.company.clone(),
            location: cli.location.clone(),
            designation: cli.designation.clone(),
            source: cli.source.clone(),
            assigned_to: cli.assigned_to,
            date_from: cli.from,
            date_to: cli.to,
            sort_by: cli.sort_by.parse::<SortField>()?,
            sort_order: cli.sort_order.parse::<SortOrder>()?,
            limit: cli.limit,
        };

        let leads = list_leads(store.pool(), &filter).await?;
        let csv = render_leads_csv(&leads)?;

        match &cli.output {
            Some(path) => {
                std::fs::write(path, csv)?;
                tracing::info!("Exported {} leads to {}", leads.len(), path.display());
            }
            None => print!("{}", csv),
        }
        anyhow::Ok(())
    }
    .await;

    db.close().await;
    result
}
