use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use leads_hub::config::{BootstrapAdmin, Config};
use leads_hub::db::Database;
use leads_hub::db_storage::PgLeadStore;
use leads_hub::identity::{require_assignee, resolve_default_assignee};
use leads_hub::pipeline::{ImportPipeline, ImportReport};
use leads_hub::skip_report::default_report_path;
use leads_hub::store::{LeadStore, MemoryLeadStore};

/// Import leads from a CSV file.
#[derive(Parser, Debug)]
#[command(name = "leads-import", version)]
struct Cli {
    /// CSV file to import.
    #[arg(default_value = "leads.csv")]
    input: PathBuf,

    /// Where to write rejected rows. Defaults to `<input>_skipped.csv` next to the input.
    #[arg(long)]
    skipped_output: Option<PathBuf>,

    /// User id to assign imported leads to (overrides IMPORT_ASSIGNEE_ID).
    #[arg(long, conflicts_with = "dry_run")]
    assignee: Option<Uuid>,

    /// Validate and de-duplicate in memory without touching the database.
    #[arg(long)]
    dry_run: bool,
}

/// Entry point for the importer.
///
/// Sets up logging, connects to the database (unless `--dry-run`), resolves
/// the default assignee once, runs the import, prints the summary and writes
/// the skip report. Any failure before the summary exits non-zero.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leads_hub=info,leads_import=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let report_path = cli
        .skipped_output
        .clone()
        .unwrap_or_else(|| default_report_path(&cli.input));

    let report = if cli.dry_run {
        dotenvy::dotenv().ok();
        tracing::info!("Dry run: leads are validated in memory only");
        let store = MemoryLeadStore::new();
        import(&store, &cli, None, &BootstrapAdmin::from_env()).await?
    } else {
        let config = Config::from_env()?;

        tracing::info!("Connecting to database...");
        let db = Database::new(&config.database_url, config.db_max_connections).await?;
        db.migrate().await?;
        tracing::info!("✓ Database connected successfully");

        let store = PgLeadStore::new(db.pool.clone());
        let assignee = cli.assignee.or(config.default_assignee_id);
        let result = import(&store, &cli, assignee, &config.bootstrap_admin).await;
        db.close().await;
        result?
    };

    println!("\n{}", report.summary());

    if report.write_skip_report(&report_path)? {
        println!("\nSkipped leads written to: {}", report_path.display());
    }

    Ok(())
}

async fn import<S: LeadStore>(
    store: &S,
    cli: &Cli,
    assignee: Option<Uuid>,
    bootstrap: &BootstrapAdmin,
) -> anyhow::Result<ImportReport> {
    let owner = match assignee {
        Some(id) => require_assignee(store, id).await?,
        None => resolve_default_assignee(store, bootstrap).await?,
    };
    tracing::info!("Using user: {} ({})", owner.name, owner.email);

    let pipeline = ImportPipeline::new(store, owner.id);
    let report = pipeline
        .run_file(&cli.input)
        .await
        .with_context(|| format!("Import of {} failed", cli.input.display()))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_rejects_explicit_assignee() {
        let id = Uuid::new_v4().to_string();
        let err = Cli::try_parse_from(["leads-import", "in.csv", "--dry-run", "--assignee", &id]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        assert!(Cli::try_parse_from(["leads-import", "in.csv", "--assignee", &id]).is_ok());
        assert!(Cli::try_parse_from(["leads-import", "--dry-run"]).is_ok());
    }
}
