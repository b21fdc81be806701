use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::error::{StoreError, UniqueField};
use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};

/// Process-local user store, used when no database is configured.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        // check and insert under one write lock so concurrent signups cannot both pass
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            name_full: user.name_full,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            name_full: "Alice A".into(),
            password_hash: "$2b$04$digest".into(),
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("alice123", "a@x.com")).await.unwrap();
        let found = store.find_by_email("a@x.com").await.unwrap().expect("user exists");
        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "alice123");
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = MemoryUserStore::new();
        let a = store.create(new_user("alice123", "a@x.com")).await.unwrap();
        let b = store.create(new_user("bobby123", "b@x.com")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("alice123", "a@x.com")).await.unwrap();
        let err = store.create(new_user("other123", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Email)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("alice123", "a@x.com")).await.unwrap();
        let err = store.create(new_user("alice123", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Username)));
    }
}
