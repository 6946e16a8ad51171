use crate::errors::AppError;
use crate::models::{NewLead, NewUser, User, UserRole};
use crate::store::LeadStore;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed lead and user storage.
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    /// Inserts a lead. Each insert commits on its own, so an interrupted import
    /// keeps every row written before the interruption.
    async fn create_lead(&self, lead: &NewLead) -> Result<Uuid, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO leads (
                id, first_name, last_name, designation, profile_link, email,
                location, company_name, company_link, job_title, job_link,
                source, assigned_to, created_by
            )
            VALUES ($1, $2, $3, $4, $5, lower($6), $7, lower($8), $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&lead.first_name)
        .bind(&lead.last_name)
        .bind(&lead.designation)
        .bind(&lead.profile_link)
        .bind(&lead.email)
        .bind(&lead.location)
        .bind(&lead.company_name)
        .bind(&lead.company_link)
        .bind(&lead.job_title)
        .bind(&lead.job_link)
        .bind(&lead.source)
        .bind(lead.assigned_to)
        .bind(lead.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_active_user(&self, role: Option<UserRole>) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at
            FROM users
            WHERE is_active = true
              AND ($1::text IS NULL OR role = $1)
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, is_active, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, is_active, created_at FROM users WHERE email = lower(trim($1))",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, role, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
