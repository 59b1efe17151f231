use sqlx::FromRow;

use crate::users::schema::UserRecord;

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: Option<String>,
    pub image: String,
    pub image_url: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: Some(row.id),
            email: row.email,
            username: row.username,
            password: row.password,
            image: row.image,
            image_url: row.image_url,
        }
    }
}
