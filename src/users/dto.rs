use serde::Serialize;

use crate::users::schema::UserRecord;

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub image: String,
    pub image_url: String,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            email: user.email,
            username: user.username,
            image: user.image,
            image_url: user.image_url,
        }
    }
}
