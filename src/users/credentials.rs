use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::warn;

use crate::users::error::UserError;
use crate::users::schema::UserRecord;

/// Maps a candidate password to its stored form. Absent and empty passwords
/// are kept as given; anything else becomes an argon2 PHC string under a
/// fresh salt.
pub fn seal(password: Option<String>) -> Result<Option<String>, UserError> {
    match password {
        Some(plain) if !plain.is_empty() => {
            let salt = SaltString::generate(&mut OsRng);
            let phc = Argon2::default()
                .hash_password(plain.as_bytes(), &salt)
                .map_err(|e| UserError::Password(e.to_string()))?;
            Ok(Some(phc.to_string()))
        }
        other => Ok(other),
    }
}

/// Checks `plain` against the password stored on `user`.
pub fn verify(user: &UserRecord, plain: &str) -> bool {
    let stored = match user.password.as_deref() {
        None => return false,
        Some("") => return plain.is_empty(),
        Some(stored) => stored,
    };
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(user_id = ?user.id, error = %e, "stored password is not a phc string");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(password: Option<&str>) -> UserRecord {
        UserRecord {
            id: Some("u-1".into()),
            email: "a@b.com".into(),
            username: "abcd".into(),
            password: password.map(str::to_string),
            image: String::new(),
            image_url: String::new(),
        }
    }

    #[test]
    fn absent_and_empty_passwords_are_stored_as_given() {
        assert_eq!(seal(None).unwrap(), None);
        assert_eq!(seal(Some(String::new())).unwrap(), Some(String::new()));
    }

    #[test]
    fn sealed_password_matches_only_itself() {
        let stored = seal(Some("open-sesame".into())).unwrap();
        let user = user_with(stored.as_deref());
        assert!(user.password.as_deref().unwrap().starts_with("$argon2"));
        assert!(verify(&user, "open-sesame"));
        assert!(!verify(&user, "open-sesame2"));
    }

    #[test]
    fn resealing_uses_a_new_salt() {
        let first = seal(Some("same-secret".into())).unwrap().unwrap();
        let second = seal(Some("same-secret".into())).unwrap().unwrap();
        assert_ne!(first, second);
        assert!(verify(&user_with(Some(second.as_str())), "same-secret"));
    }

    #[test]
    fn verify_handles_absent_and_empty_stored_passwords() {
        assert!(!verify(&user_with(None), ""));
        assert!(!verify(&user_with(Some("plaintext-from-import")), "plaintext-from-import"));
        assert!(verify(&user_with(Some("")), ""));
        assert!(!verify(&user_with(Some("")), "guess"));
    }
}
