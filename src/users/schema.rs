use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::users::error::UserError;
use crate::users::repo::UserStore;

pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 40;

/// Fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Username,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Email => f.write_str("Email"),
            Field::Username => f.write_str("Username"),
        }
    }
}

/// Which part of the username pattern was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameViolation {
    TooShort,
    TooLong,
    InvalidCharacter(char),
    LeadingSeparator,
    TrailingSeparator,
    ConsecutiveSeparators,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required!")]
    MissingField(Field),
    #[error("{0} invalid, it should contain 4-40 alphanumeric letters and be unique!")]
    InvalidFormat(Field, UsernameViolation),
    #[error("{0} already exists!")]
    DuplicateValue(Field),
}

/// A well-formed user. `image` and `image_url` are never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Option<String>,
    pub email: String,
    pub username: String,
    pub password: Option<String>,
    pub image: String,
    pub image_url: String,
}

/// Raw field values supplied by a caller, before any rule has been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCandidate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl UserCandidate {
    /// Applies every field rule that does not need the store.
    pub fn into_record(self) -> Result<UserRecord, ValidationError> {
        let email = required(self.email, Field::Email)?;
        let username = required(self.username, Field::Username)?;
        check_username(&username)
            .map_err(|v| ValidationError::InvalidFormat(Field::Username, v))?;

        Ok(UserRecord {
            id: self.id,
            email,
            username,
            password: self.password,
            image: self.image.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, field: Field) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn is_separator(c: char) -> bool {
    c == '.' || c == '_'
}

/// Checks `username` against the structural username rules: 4-40 characters
/// from `[A-Za-z0-9._]`, no separator (`.` or `_`) at either end and no two
/// separators in a row.
pub fn check_username(username: &str) -> Result<(), UsernameViolation> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(UsernameViolation::TooShort);
    }
    if len > USERNAME_MAX_LEN {
        return Err(UsernameViolation::TooLong);
    }

    let mut prev_separator = false;
    for (i, c) in username.chars().enumerate() {
        let separator = is_separator(c);
        if !separator && !c.is_ascii_alphanumeric() {
            return Err(UsernameViolation::InvalidCharacter(c));
        }
        if separator && i == 0 {
            return Err(UsernameViolation::LeadingSeparator);
        }
        if separator && prev_separator {
            return Err(UsernameViolation::ConsecutiveSeparators);
        }
        prev_separator = separator;
    }

    if prev_separator {
        return Err(UsernameViolation::TrailingSeparator);
    }
    Ok(())
}

/// Validates a new user, consulting `store` for email uniqueness.
/// Nothing is persisted.
pub async fn validate(
    candidate: UserCandidate,
    store: &dyn UserStore,
) -> Result<UserRecord, UserError> {
    let record = candidate.into_record()?;
    if store.email_exists(&record.email).await? {
        return Err(ValidationError::DuplicateValue(Field::Email).into());
    }
    Ok(record)
}

/// Validates replacement values for the user `id`. The user's own email is
/// not a duplicate of itself.
pub async fn validate_update(
    id: &str,
    candidate: UserCandidate,
    store: &dyn UserStore,
) -> Result<UserRecord, UserError> {
    let mut record = candidate.into_record()?;
    if let Some(existing) = store.find_by_email(&record.email).await? {
        if existing.id.as_deref() != Some(id) {
            return Err(ValidationError::DuplicateValue(Field::Email).into());
        }
    }
    record.id = Some(id.to_string());
    Ok(record)
}
