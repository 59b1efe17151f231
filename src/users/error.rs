use thiserror::Error;

use crate::users::repo::StoreError;
use crate::users::schema::{Field, ValidationError};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("user {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(StoreError),
    #[error("password hashing failed: {0}")]
    Password(String),
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            // the unique index caught what the up-front check missed
            StoreError::EmailTaken => ValidationError::DuplicateValue(Field::Email).into(),
            StoreError::NotFound(id) => UserError::NotFound(id),
            other => UserError::Store(other),
        }
    }
}

impl UserError {
    /// True when the caller supplied bad input rather than the backend failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            UserError::Validation(_) | UserError::NotFound(_) | UserError::Store(StoreError::IdTaken(_))
        )
    }
}
