use serde::Deserialize;
use uuid::Uuid;

/// Placeholder account created when the store has no active user at all.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            name: "System Admin".to_string(),
            email: "admin@leads-hub.com".to_string(),
            password: "temp123".to_string(),
        }
    }
}

impl BootstrapAdmin {
    /// Reads `BOOTSTRAP_ADMIN_*` overrides, falling back to the placeholder account.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, fallback: String| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
        };

        Self {
            name: read("BOOTSTRAP_ADMIN_NAME", defaults.name),
            email: read("BOOTSTRAP_ADMIN_EMAIL", defaults.email).to_lowercase(),
            password: read("BOOTSTRAP_ADMIN_PASSWORD", defaults.password),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Explicit default assignee; when set, identity resolution is skipped.
    pub default_assignee_id: Option<Uuid>,
    pub bootstrap_admin: BootstrapAdmin,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| validate_database_url(&url).map(|_| url))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a positive number"))
                .and_then(|n: u32| {
                    if n == 0 {
                        anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
                    }
                    Ok(n)
                })?,
            default_assignee_id: std::env::var("IMPORT_ASSIGNEE_ID")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    Uuid::parse_str(s.trim())
                        .map_err(|_| anyhow::anyhow!("IMPORT_ASSIGNEE_ID must be a UUID"))
                })
                .transpose()?,
            bootstrap_admin: BootstrapAdmin::from_env(),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Pool size: {}", config.db_max_connections);
        if let Some(ref assignee) = config.default_assignee_id {
            tracing::info!("Default assignee configured: {}", assignee);
        }

        Ok(config)
    }
}

fn validate_database_url(url: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("DB_URL cannot be empty");
    }
    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_scheme_is_checked() {
        assert!(validate_database_url("postgres://localhost/leads").is_ok());
        assert!(validate_database_url("postgresql://u:p@db:5432/leads").is_ok());
        assert!(validate_database_url("mongodb://localhost:27017/leads-hub").is_err());
        assert!(validate_database_url("   ").is_err());
    }

    #[test]
    fn bootstrap_defaults_match_placeholder_account() {
        let admin = BootstrapAdmin::default();
        assert_eq!(admin.name, "System Admin");
        assert_eq!(admin.email, "admin@leads-hub.com");
        assert_eq!(admin.password, "temp123");
    }
}
