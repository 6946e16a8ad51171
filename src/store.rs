//! Persistence contract used by the importer, plus an in-memory implementation
//! for dry runs and tests.

use crate::errors::AppError;
use crate::models::{AdditionalEmail, Lead, NewLead, NewUser, User, UserRole};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use std::sync::Mutex;
use uuid::Uuid;

/// Lead and user persistence.
///
/// `create_lead` must return [`AppError::Conflict`] when the
/// `(email, company_name, job_link)` key already exists.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn create_lead(&self, lead: &NewLead) -> Result<Uuid, AppError>;

    /// An active user, restricted to `role` when given. Oldest account first.
    async fn find_active_user(&self, role: Option<UserRole>) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn create_user(&self, user: &NewUser) -> Result<User, AppError>;
}

#[derive(Default)]
struct MemoryState {
    leads: Vec<Lead>,
    users: Vec<User>,
}

/// Process-local store with the same uniqueness rules as the database.
#[derive(Default)]
pub struct MemoryLeadStore {
    state: Mutex<MemoryState>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored leads in insertion order.
    pub fn leads(&self) -> Vec<Lead> {
        self.lock().leads.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means another test thread panicked mid-insert.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn lead_key(lead: &Lead) -> (String, String, String) {
    (
        lead.email.to_lowercase(),
        lead.company_name.to_lowercase(),
        lead.job_link.clone().unwrap_or_default(),
    )
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn create_lead(&self, lead: &NewLead) -> Result<Uuid, AppError> {
        let mut state = self.lock();
        let key = lead.identity_key();
        if state.leads.iter().any(|l| lead_key(l) == key) {
            return Err(AppError::Conflict("leads_identity_key".to_string()));
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        state.leads.push(Lead {
            id,
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            designation: lead.designation.clone(),
            profile_link: lead.profile_link.clone(),
            email: lead.email.to_lowercase(),
            person_mobile: None,
            location: lead.location.clone(),
            company_name: lead.company_name.to_lowercase(),
            company_link: lead.company_link.clone(),
            job_title: lead.job_title.clone(),
            job_link: lead.job_link.clone(),
            additional_emails: Json(Vec::<AdditionalEmail>::new()),
            source: lead.source.clone(),
            notes: None,
            assigned_to: lead.assigned_to,
            created_by: lead.created_by,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_active_user(&self, role: Option<UserRole>) -> Result<Option<User>, AppError> {
        let state = self.lock();
        Ok(state
            .users
            .iter()
            .filter(|u| u.is_active)
            .filter(|u| role.map_or(true, |r| u.role == r.as_str()))
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("users_email_key".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
            created_at: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(email: &str, company: &str, job_link: Option<&str>) -> NewLead {
        NewLead {
            first_name: "Ada".into(),
            last_name: "N/A".into(),
            designation: "CTO".into(),
            profile_link: None,
            email: email.into(),
            location: None,
            company_name: company.into(),
            company_link: None,
            job_title: None,
            job_link: job_link.map(str::to_string),
            source: None,
            assigned_to: Uuid::nil(),
            created_by: Uuid::nil(),
        }
    }

    fn user(email: &str, role: UserRole, is_active: bool) -> NewUser {
        NewUser {
            name: email.into(),
            email: email.into(),
            password_hash: "x".into(),
            role,
            is_active,
        }
    }

    #[tokio::test]
    async fn duplicate_identity_key_is_a_conflict() {
        let store = MemoryLeadStore::new();
        store.create_lead(&lead("a@x.com", "acme", None)).await.unwrap();

        let err = store
            .create_lead(&lead("A@X.com", "ACME", None))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // A different job link is a different lead.
        store
            .create_lead(&lead("a@x.com", "acme", Some("https://jobs/1")))
            .await
            .unwrap();
        assert_eq!(store.leads().len(), 2);
    }

    #[tokio::test]
    async fn active_user_lookup_respects_role_and_status() {
        let store = MemoryLeadStore::new();
        store.create_user(&user("off@x.com", UserRole::Admin, false)).await.unwrap();
        let member = store.create_user(&user("member@x.com", UserRole::User, true)).await.unwrap();

        assert!(store.find_active_user(Some(UserRole::Admin)).await.unwrap().is_none());
        let any = store.find_active_user(None).await.unwrap().unwrap();
        assert_eq!(any.id, member.id);

        let found = store.find_user_by_email(" MEMBER@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, member.id);
        assert!(store.find_user_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
