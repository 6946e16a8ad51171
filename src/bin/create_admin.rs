//! Creates an administrator account if one with the given email does not exist.

use clap::Parser;
use leads_hub::config::Config;
use leads_hub::db::Database;
use leads_hub::db_storage::PgLeadStore;
use leads_hub::models::{NewUser, UserRole};
use leads_hub::store::LeadStore;

#[derive(Parser, Debug)]
#[command(name = "create-admin", version)]
struct Cli {
    #[arg(long, default_value = "Admin User")]
    name: String,

    #[arg(long, default_value = "admin@leadshub.com")]
    email: String,

    /// Initial password; read from ADMIN_PASSWORD when not passed.
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123")]
    password: String,
}

/// Main entry point for the admin bootstrap utility.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let db = Database::new(&config.database_url, 1).await?;
    db.migrate().await?;
    let store = PgLeadStore::new(db.pool.clone());

    let result = async {
        if store.find_user_by_email(&cli.email).await?.is_some() {
            println!("Admin user already exists");
            return Ok(());
        }

        let admin = NewUser::with_password(&cli.name, &cli.email, &cli.password, UserRole::Admin)?;
        let created = store.create_user(&admin).await?;
        tracing::info!("Admin user created: {}", created.id);
        println!("Admin user created successfully");
        println!("Email: {}", created.email);
        println!("Password: {}", cli.password);
        anyhow::Ok(())
    }
    .await;

    db.close().await;
    result
}
