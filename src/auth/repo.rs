use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, ProfileChanges, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("user not found")]
    UserNotFound,
}

/// Authoritative mapping from id/email to user records. The trait is the seam
/// for swapping the in-memory map for a database without touching handlers.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Option<User>;
    async fn find_by_id(&self, id: Uuid) -> Option<User>;
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, StoreError>;
    async fn update_password_hash(&self, id: Uuid, password_hash: String)
        -> Result<(), StoreError>;
}

/// In-memory store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryUsers {
    users: RwLock<HashMap<Uuid, User>>,
}

fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        // The uniqueness check and the insert must share one critical
        // section, otherwise two concurrent registrations with the same
        // email can both pass the check.
        let mut users = self.users.write();
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: None,
            location: None,
            language: "en".into(),
            role: new.role,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        debug!(user_id = %user.id, total = users.len(), "user created");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users.read().get(&id).cloned()
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<User, StoreError> {
        let mut users = self.users.write();
        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound)?;

        if let Some(v) = provided(changes.first_name) {
            user.first_name = v;
        }
        if let Some(v) = provided(changes.last_name) {
            user.last_name = v;
        }
        if let Some(v) = provided(changes.phone) {
            user.phone = Some(v);
        }
        if let Some(v) = provided(changes.location) {
            user.location = Some(v);
        }
        if let Some(v) = provided(changes.language) {
            user.language = v;
        }
        Ok(user.clone())
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write();
        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        user.password_hash = password_hash;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$argon2id$fake-hash".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryUsers::default();
        let user = store.create(new_user("a@x.com")).await.expect("create");
        assert_eq!(user.language, "en");
        assert_eq!(user.role, Role::Customer);

        let by_email = store.find_by_email("a@x.com").await.expect("by email");
        assert_eq!(by_email.id, user.id);
        let by_id = store.find_by_id(user.id).await.expect("by id");
        assert_eq!(by_id.email, "a@x.com");
        assert!(store.find_by_email("other@x.com").await.is_none());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = InMemoryUsers::default();
        store.create(new_user("a@x.com")).await.expect("first");
        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_yield_exactly_one_winner() {
        let store = Arc::new(InMemoryUsers::default());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create(new_user("race@x.com")).await
            }));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.expect("task should not panic") {
                Ok(_) => successes += 1,
                Err(StoreError::DuplicateEmail) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(duplicates, 15);
    }

    #[tokio::test]
    async fn update_profile_touches_only_provided_fields() {
        let store = InMemoryUsers::default();
        let user = store.create(new_user("a@x.com")).await.expect("create");

        let updated = store
            .update_profile(
                user.id,
                ProfileChanges {
                    location: Some("Berlin".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.location.as_deref(), Some("Berlin"));
        assert_eq!(updated.first_name, "Ann");
        assert_eq!(updated.last_name, "Lee");
        assert_eq!(updated.phone, None);
        assert_eq!(updated.language, "en");
    }

    #[tokio::test]
    async fn update_profile_skips_empty_values() {
        let store = InMemoryUsers::default();
        let user = store.create(new_user("a@x.com")).await.expect("create");

        let updated = store
            .update_profile(
                user.id,
                ProfileChanges {
                    first_name: Some("   ".into()),
                    phone: Some("+49 170 1234567".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.first_name, "Ann");
        assert_eq!(updated.phone.as_deref(), Some("+49 170 1234567"));
    }

    #[tokio::test]
    async fn update_profile_unknown_user() {
        let store = InMemoryUsers::default();
        let err = store
            .update_profile(Uuid::new_v4(), ProfileChanges::default())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::UserNotFound);
    }

    #[tokio::test]
    async fn update_password_hash_replaces_in_place() {
        let store = InMemoryUsers::default();
        let user = store.create(new_user("a@x.com")).await.expect("create");

        store
            .update_password_hash(user.id, "$argon2id$new-hash".into())
            .await
            .expect("update hash");

        let reloaded = store.find_by_id(user.id).await.expect("find");
        assert_eq!(reloaded.password_hash, "$argon2id$new-hash");
    }
}
