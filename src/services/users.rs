//! User profile service.

use std::sync::Arc;

use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{NewUser, User, UserPatch, UserRole, UserStatus, is_plausible_email};
use crate::services::records::Records;
use crate::services::validate;
use crate::storage::{Collection, DocumentStore, Query, to_document};

#[derive(Clone)]
pub struct UserService {
    records: Records,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    /// Create the profile for a freshly registered account.
    pub async fn create_profile(&self, input: NewUser) -> Result<User> {
        let id = validate::required("user id", &input.id)?;
        let name = validate::required("name", &input.name)?;
        let email = checked_email(&input.email)?;

        let document = to_document(&json!({
            "id": id,
            "name": name,
            "email": email,
            "phone": validate::optional(input.phone),
            "status": UserStatus::Active,
            "role": UserRole::User,
        }))?;

        let user: User = self.records.create(Collection::Users, document).await?;
        log::info!("Created profile for {} ({})", user.email, user.id);
        Ok(user)
    }

    pub async fn get_profile(&self, id: &str) -> Result<User> {
        self.records.get(Collection::Users, id).await
    }

    pub async fn update_profile(&self, id: &str, mut patch: UserPatch) -> Result<User> {
        if let Some(name) = &patch.name {
            patch.name = Some(validate::required("name", name)?);
        }
        if let Some(email) = &patch.email {
            patch.email = Some(checked_email(email)?);
        }
        self.records
            .update(Collection::Users, id, to_document(&patch)?)
            .await
    }

    /// All profiles, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let query = Query::new().order_desc("createdAt");
        self.records.list(Collection::Users, &query).await
    }

    pub async fn set_status(&self, id: &str, status: UserStatus) -> Result<User> {
        let patch = to_document(&json!({ "status": status }))?;
        let user: User = self.records.update(Collection::Users, id, patch).await?;
        log::info!("User {} is now {}", user.id, status.as_str());
        Ok(user)
    }
}

fn checked_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !is_plausible_email(&email) {
        return Err(AppError::validation(format!("invalid email '{email}'")));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::models::CollectionIds;
    use crate::storage::LocalStore;

    fn service() -> (TempDir, UserService) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path(), CollectionIds::default());
        (dir, UserService::new(Arc::new(store)))
    }

    fn new_user(id: &str, email: &str) -> NewUser {
        NewUser {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_create_profile_uses_account_id() {
        let (_dir, service) = service();
        let user = service
            .create_profile(new_user("acct-1", " Ada@Example.COM "))
            .await
            .unwrap();

        assert_eq!(user.id, "acct-1");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.role, UserRole::User);
        assert_eq!(service.get_profile("acct-1").await.unwrap(), user);

        let again = service.create_profile(new_user("acct-1", "x@y.io")).await;
        assert!(matches!(again, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_bad_email() {
        let (_dir, service) = service();
        assert!(service.create_profile(new_user("a", "nope")).await.is_err());

        service.create_profile(new_user("b", "b@c.de")).await.unwrap();
        let patch = UserPatch {
            email: Some("broken@".into()),
            ..UserPatch::default()
        };
        assert!(service.update_profile("b", patch).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_status() {
        let (_dir, service) = service();
        service.create_profile(new_user("u1", "u1@example.com")).await.unwrap();
        service.create_profile(new_user("u2", "u2@example.com")).await.unwrap();

        let patch = UserPatch {
            name: Some("Ada Lovelace".into()),
            phone: Some("+44 20 0000".into()),
            ..UserPatch::default()
        };
        let updated = service.update_profile("u1", patch).await.unwrap();
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.phone.as_deref(), Some("+44 20 0000"));

        let suspended = service.set_status("u2", UserStatus::Suspended).await.unwrap();
        assert_eq!(suspended.status, UserStatus::Suspended);

        assert_eq!(service.list_users().await.unwrap().len(), 2);
        assert!(
            service
                .set_status("ghost", UserStatus::Inactive)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }
}
