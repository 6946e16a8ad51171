use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Source tag stamped on every lead created by the CSV importer.
pub const CSV_IMPORT_SOURCE: &str = "CSV Import";

// ============ Database Models ============

/// A prospective sales contact.
///
/// `(email, company_name, job_link)` is unique across the table; email and
/// company name are stored lowercased.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lead {
    /// Unique identifier for the lead.
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub designation: String,
    /// Public profile URL (e.g. a social profile).
    pub profile_link: Option<String>,
    /// Lowercased contact email.
    pub email: String,
    pub person_mobile: Option<String>,
    /// City or location.
    pub location: Option<String>,
    /// Lowercased company name.
    pub company_name: String,
    pub company_link: Option<String>,
    pub job_title: Option<String>,
    pub job_link: Option<String>,
    /// Other people reachable at the same company.
    pub additional_emails: Json<Vec<AdditionalEmail>>,
    /// Free-text origin tag (e.g. "CSV Import").
    pub source: Option<String>,
    pub notes: Option<String>,
    /// User the lead is assigned to.
    pub assigned_to: Uuid,
    /// User that created the lead.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Secondary contact attached to a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalEmail {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub designation: Option<String>,
    pub profile_link: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Insert payload for a lead. Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
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
    pub source: Option<String>,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
}

impl NewLead {
    /// Key enforced by the store's uniqueness constraint.
    pub fn identity_key(&self) -> (String, String, String) {
        (
            self.email.to_lowercase(),
            self.company_name.to_lowercase(),
            self.job_link.clone().unwrap_or_default(),
        )
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account that leads can be assigned to.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// bcrypt hash; never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// "admin" or "user".
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin.as_str()
    }
}

/// Insert payload for a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl NewUser {
    /// Builds an active account, hashing `password` with bcrypt.
    pub fn with_password(
        name: impl Into<String>,
        email: impl Into<String>,
        password: &str,
        role: UserRole,
    ) -> Result<Self, crate::errors::AppError> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
            crate::errors::AppError::InternalError(format!("Failed to hash password: {}", e))
        })?;

        Ok(Self {
            name: name.into(),
            email: email.into().trim().to_lowercase(),
            password_hash,
            role,
            is_active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_lead(email: &str, company: &str, job_link: Option<&str>) -> NewLead {
        NewLead {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            designation: "CTO".into(),
            profile_link: None,
            email: email.into(),
            location: None,
            company_name: company.into(),
            company_link: None,
            job_title: None,
            job_link: job_link.map(str::to_string),
            source: Some(CSV_IMPORT_SOURCE.into()),
            assigned_to: Uuid::nil(),
            created_by: Uuid::nil(),
        }
    }

    #[test]
    fn identity_key_ignores_case_and_treats_missing_job_link_as_empty() {
        let a = new_lead("Ada@Example.com", "Acme", None);
        let b = new_lead("ada@example.com", "ACME", Some(""));
        assert_eq!(a.identity_key(), b.identity_key());

        let c = new_lead("ada@example.com", "acme", Some("https://jobs/1"));
        assert_ne!(a.identity_key(), c.identity_key());
    }

    #[test]
    fn user_role_round_trips_as_lowercase() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(serde_json::to_string(&UserRole::User).unwrap(), "\"user\"");
    }

    #[test]
    fn new_user_hashes_password() {
        let user = NewUser::with_password("Root", " Root@Example.COM ", "temp123", UserRole::Admin)
            .unwrap();
        assert_eq!(user.email, "root@example.com");
        assert_ne!(user.password_hash, "temp123");
        assert!(bcrypt::verify("temp123", &user.password_hash).unwrap());
    }
}
