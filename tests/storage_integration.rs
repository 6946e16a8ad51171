use std::env;
use uuid::Uuid;

use leads_hub::data::db_storage::PgLeadStore;
use leads_hub::data::store::LeadStore;
use leads_hub::db::Database;
use leads_hub::export::{list_leads, LeadFilter, LeadScope};
use leads_hub::models::{NewUser, UserRole};
use leads_hub::pipeline::ImportPipeline;

/// Integration smoke test for the Postgres store: import, duplicate detection, export.
/// Marked ignored so it never runs against a real database by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn import_twice_against_postgres_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 2).await?;
    db.migrate().await?;
    let store = PgLeadStore::new(db.pool.clone());

    // Unique values so repeated runs don't collide with earlier data.
    let tag = Uuid::new_v4().simple().to_string();
    let owner = store
        .create_user(&NewUser {
            name: "Smoke Test".into(),
            email: format!("smoke-{}@leads-hub.test", tag),
            password_hash: "not-a-real-hash".into(),
            role: UserRole::User,
            is_active: true,
        })
        .await?;

    let input = format!(
        "First Name,Email,Company Name,Designation\n\
         Ada,Ada.{tag}@Example.com,Acme {tag},CTO\n\
         Alan,alan.{tag}@example.com,Acme {tag},CEO\n"
    );

    let pipeline = ImportPipeline::new(&store, owner.id);
    let first = pipeline.run(&input).await?;
    assert_eq!(first.summary().created, 2);

    let second = pipeline.run(&input).await?;
    assert_eq!(second.summary().created, 0);
    assert_eq!(second.summary().skipped, 2);
    assert_eq!(second.summary().errors, 0);

    let exported = list_leads(
        store.pool(),
        &LeadFilter {
            scope: LeadScope::AssignedTo(owner.id),
            company: Some(tag.clone()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(exported.len(), 2);
    assert!(exported.iter().all(|l| l.company_name == format!("acme {}", tag)));

    db.close().await;
    Ok(())
}
