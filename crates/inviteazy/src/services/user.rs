use std::sync::Arc;

use uuid::Uuid;

use inviteazy_core::invitation::{NewUser, User, UserPatch};
use inviteazy_core::storage::{RepositoryError, Result, UserRepository};

/// Bcrypt work factor for stored passwords.
pub const BCRYPT_COST: u32 = 10;

/// User operations. Passwords are hashed before they reach the repository.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.repo.find_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>> {
        self.repo.find_by_id(id).await
    }

    pub async fn create(&self, mut user: NewUser) -> Result<User> {
        user.password = hash_password(user.password).await?;
        let user = self.repo.create(user).await?;
        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, mut patch: UserPatch) -> Result<Option<User>> {
        if let Some(password) = patch.password.take() {
            patch.password = Some(hash_password(password).await?);
        }
        self.repo.update(id, patch).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}

/// Hashes a password on the blocking pool.
async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| RepositoryError::store_operation("failed to hash password", e))?
        .map_err(|e| RepositoryError::store_operation("failed to hash password", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryRepository;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryRepository::new()))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Dara".to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
            role: Default::default(),
            phone_number: None,
            profile_picture: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_stores_a_hash() {
        let service = service();

        let user = service.create(new_user("dara@example.com")).await.unwrap();

        assert_ne!(user.password, "hunter2");
        assert!(user.password.starts_with("$2"));
        assert!(bcrypt::verify("hunter2", &user.password).unwrap());
        assert!(!bcrypt::verify("wrong", &user.password).unwrap());
    }

    #[tokio::test]
    async fn test_update_rehashes_new_password() {
        let service = service();
        let user = service.create(new_user("dara@example.com")).await.unwrap();

        let patch = UserPatch {
            password: Some("correct horse".to_string()),
            ..Default::default()
        };
        let updated = service.update(user.id, patch).await.unwrap().unwrap();

        assert_ne!(updated.password, user.password);
        assert!(bcrypt::verify("correct horse", &updated.password).unwrap());
    }

    #[tokio::test]
    async fn test_update_without_password_keeps_hash() {
        let service = service();
        let user = service.create(new_user("dara@example.com")).await.unwrap();

        let patch = UserPatch {
            name: Some("Dara O.".to_string()),
            ..Default::default()
        };
        let updated = service.update(user.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.name, "Dara O.");
        assert_eq!(updated.password, user.password);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let service = service();
        service.create(new_user("dara@example.com")).await.unwrap();

        let result = service.create(new_user("dara@example.com")).await;

        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists { entity_type: "User", .. })
        ));
    }
}
