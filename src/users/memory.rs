use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::users::repo::{assign_id, StoreError, UserStore};
use crate::users::schema::UserRecord;

/// In-process store keyed by id. Used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_owner<'a>(users: &'a HashMap<String, UserRecord>, email: &str) -> Option<&'a UserRecord> {
    users.values().find(|u| u.email == email)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(email_owner(&*self.users.read().await, email).is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(email_owner(&*self.users.read().await, email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn save(&self, mut record: UserRecord) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        if email_owner(&users, &record.email).is_some() {
            return Err(StoreError::EmailTaken);
        }
        let id = assign_id(record.id.take());
        if users.contains_key(&id) {
            return Err(StoreError::IdTaken(id));
        }
        record.id = Some(id.clone());
        users.insert(id, record.clone());
        Ok(record)
    }

    async fn replace(&self, record: UserRecord) -> Result<UserRecord, StoreError> {
        let id = record.id.clone().unwrap_or_default();
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if let Some(owner) = email_owner(&users, &record.email) {
            if owner.id.as_deref() != Some(id.as_str()) {
                return Err(StoreError::EmailTaken);
            }
        }
        users.insert(id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: Option<&str>, email: &str, username: &str) -> UserRecord {
        UserRecord {
            id: id.map(str::to_string),
            email: email.into(),
            username: username.into(),
            password: None,
            image: String::new(),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn save_assigns_id_and_answers_lookups() {
        let store = MemoryUserStore::new();
        let saved = store.save(record(None, "a@b.com", "abcd")).await.unwrap();
        let id = saved.id.clone().unwrap();

        assert!(store.email_exists("a@b.com").await.unwrap());
        assert!(!store.email_exists("other@b.com").await.unwrap());
        assert_eq!(store.find_by_id(&id).await.unwrap(), Some(saved.clone()));
        assert_eq!(store.find_by_email("a@b.com").await.unwrap(), Some(saved));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn save_enforces_unique_email_and_id() {
        let store = MemoryUserStore::new();
        store.save(record(Some("u-1"), "a@b.com", "abcd")).await.unwrap();

        let err = store.save(record(None, "a@b.com", "efgh")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));

        let err = store.save(record(Some("u-1"), "c@d.com", "efgh")).await.unwrap_err();
        assert!(matches!(err, StoreError::IdTaken(id) if id == "u-1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn replace_requires_existing_id() {
        let store = MemoryUserStore::new();
        let err = store.replace(record(Some("ghost"), "a@b.com", "abcd")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn replace_overwrites_and_guards_email() {
        let store = MemoryUserStore::new();
        store.save(record(Some("u-1"), "a@b.com", "abcd")).await.unwrap();
        store.save(record(Some("u-2"), "c@d.com", "efgh")).await.unwrap();

        let updated = store.replace(record(Some("u-1"), "a@b.com", "renamed")).await.unwrap();
        assert_eq!(updated.username, "renamed");

        let err = store.replace(record(Some("u-2"), "a@b.com", "efgh")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }
}
