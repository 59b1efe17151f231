use tracing::{error, info, instrument, warn};

use crate::users::credentials::seal;
use crate::users::error::UserError;
use crate::users::repo::UserStore;
use crate::users::schema::{validate, validate_update, UserCandidate, UserRecord};

fn normalize(candidate: &mut UserCandidate) {
    if let Some(email) = candidate.email.as_mut() {
        *email = email.trim().to_lowercase();
    }
}

fn logged(e: UserError) -> UserError {
    if e.is_client_error() {
        warn!(error = %e, "user write rejected");
    } else {
        error!(error = %e, "user store failure");
    }
    e
}

#[instrument(skip(store, candidate))]
pub async fn register(
    store: &dyn UserStore,
    mut candidate: UserCandidate,
) -> Result<UserRecord, UserError> {
    normalize(&mut candidate);
    let mut record = validate(candidate, store).await.map_err(logged)?;
    record.password = seal(record.password).map_err(logged)?;

    let user = store
        .save(record)
        .await
        .map_err(|e| logged(e.into()))?;
    info!(user_id = ?user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Replaces the fields of user `id`. Omitting the password keeps the stored one.
#[instrument(skip(store, candidate))]
pub async fn update(
    store: &dyn UserStore,
    id: &str,
    mut candidate: UserCandidate,
) -> Result<UserRecord, UserError> {
    let current = get(store, id).await?;

    normalize(&mut candidate);
    let mut record = validate_update(id, candidate, store)
        .await
        .map_err(logged)?;
    record.password = match record.password {
        Some(plain) if !plain.is_empty() => seal(Some(plain)).map_err(logged)?,
        _ => current.password,
    };

    let user = store
        .replace(record)
        .await
        .map_err(|e| logged(e.into()))?;
    info!(user_id = %id, username = %user.username, "user updated");
    Ok(user)
}

pub async fn get(store: &dyn UserStore, id: &str) -> Result<UserRecord, UserError> {
    store
        .find_by_id(id)
        .await
        .map_err(|e| logged(e.into()))?
        .ok_or_else(|| logged(UserError::NotFound(id.to_string())))
}
