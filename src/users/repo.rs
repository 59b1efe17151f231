use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::users::repo_types::UserRow;
use crate::users::schema::UserRecord;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const ID_CONSTRAINT: &str = "users_pkey";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already exists")]
    EmailTaken,
    #[error("user id {0} already exists")]
    IdTaken(String),
    #[error("user {0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable home of user records, also answering uniqueness questions.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Inserts a new record, assigning an id when it has none.
    async fn save(&self, record: UserRecord) -> Result<UserRecord, StoreError>;
    /// Overwrites every field of the record with the same id.
    async fn replace(&self, record: UserRecord) -> Result<UserRecord, StoreError>;
}

/// Ids are opaque; an absent or empty one gets a fresh UUID.
pub(crate) fn assign_id(id: Option<String>) -> String {
    id.filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error, id: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some(EMAIL_CONSTRAINT) => return StoreError::EmailTaken,
            Some(ID_CONSTRAINT) => return StoreError::IdTaken(id.to_string()),
            _ => {}
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password, image, image_url
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password, image, image_url
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn save(&self, record: UserRecord) -> Result<UserRecord, StoreError> {
        let id = assign_id(record.id);
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, username, password, image, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, username, password, image, image_url
            "#,
        )
        .bind(&id)
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.password)
        .bind(&record.image)
        .bind(&record.image_url)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, &id))?;
        Ok(row.into())
    }

    async fn replace(&self, record: UserRecord) -> Result<UserRecord, StoreError> {
        let id = record.id.clone().unwrap_or_default();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $2, username = $3, password = $4, image = $5, image_url = $6
            WHERE id = $1
            RETURNING id, email, username, password, image, image_url
            "#,
        )
        .bind(&id)
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.password)
        .bind(&record.image)
        .bind(&record.image_url)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_write_error(e, &id))?;

        row.map(UserRecord::from)
            .ok_or(StoreError::NotFound(id))
    }
}
