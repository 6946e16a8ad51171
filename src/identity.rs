//! Default assignee resolution, run once before an import.

use crate::config::BootstrapAdmin;
use crate::errors::{AppError, ResultExt};
use crate::models::{NewUser, User, UserRole};
use crate::store::LeadStore;
use uuid::Uuid;

/// Picks the account imported leads are assigned to.
///
/// Prefers the oldest active admin, then any active user. When the store has
/// no active account, the bootstrap admin is created.
pub async fn resolve_default_assignee<S>(
    store: &S,
    bootstrap: &BootstrapAdmin,
) -> Result<User, AppError>
where
    S: LeadStore + ?Sized,
{
    if let Some(admin) = store
        .find_active_user(Some(UserRole::Admin))
        .await
        .context("looking up an active admin")?
    {
        return Ok(admin);
    }

    if let Some(user) = store
        .find_active_user(None)
        .await
        .context("looking up an active user")?
    {
        tracing::info!("No active admin; falling back to {}", user.email);
        return Ok(user);
    }

    tracing::info!("No users found. Creating default admin user...");
    let new_admin = NewUser::with_password(
        bootstrap.name.clone(),
        bootstrap.email.clone(),
        &bootstrap.password,
        UserRole::Admin,
    )?;
    let admin = store
        .create_user(&new_admin)
        .await
        .context("creating default admin")?;
    tracing::warn!(
        "Default admin user created ({}). Please change the password!",
        admin.email
    );

    Ok(admin)
}

/// Loads an explicitly configured assignee, which must exist and be active.
pub async fn require_assignee<S>(store: &S, id: Uuid) -> Result<User, AppError>
where
    S: LeadStore + ?Sized,
{
    let user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignee {} does not exist", id)))?;

    if !user.is_active {
        return Err(AppError::BadRequest(format!(
            "Assignee {} ({}) is not active",
            id, user.email
        )));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLeadStore;

    fn account(email: &str, role: UserRole, is_active: bool) -> NewUser {
        NewUser {
            name: email.into(),
            email: email.into(),
            password_hash: "hash".into(),
            role,
            is_active,
        }
    }

    #[tokio::test]
    async fn prefers_active_admin() {
        let store = MemoryLeadStore::new();
        store.create_user(&account("user@x.com", UserRole::User, true)).await.unwrap();
        let admin = store.create_user(&account("admin@x.com", UserRole::Admin, true)).await.unwrap();

        let chosen = resolve_default_assignee(&store, &BootstrapAdmin::default()).await.unwrap();
        assert_eq!(chosen.id, admin.id);
    }

    #[tokio::test]
    async fn falls_back_to_any_active_user() {
        let store = MemoryLeadStore::new();
        store.create_user(&account("old-admin@x.com", UserRole::Admin, false)).await.unwrap();
        let user = store.create_user(&account("user@x.com", UserRole::User, true)).await.unwrap();

        let chosen = resolve_default_assignee(&store, &BootstrapAdmin::default()).await.unwrap();
        assert_eq!(chosen.id, user.id);
        assert_eq!(store.users().len(), 2);
    }

    #[tokio::test]
    async fn creates_bootstrap_admin_when_store_is_empty() {
        let store = MemoryLeadStore::new();
        let chosen = resolve_default_assignee(&store, &BootstrapAdmin::default()).await.unwrap();

        assert_eq!(chosen.email, "admin@leads-hub.com");
        assert!(chosen.is_admin());
        assert!(chosen.is_active);
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn explicit_assignee_must_exist_and_be_active() {
        let store = MemoryLeadStore::new();
        let inactive = store.create_user(&account("gone@x.com", UserRole::User, false)).await.unwrap();

        assert!(matches!(
            require_assignee(&store, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            require_assignee(&store, inactive.id).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
