use sqlx::FromRow;
use uuid::Uuid;

use crate::images::ImageRef;

/// User record in the database. Never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub avatar_filename: Option<String>,
    pub token: String,       // opaque bearer token
    pub password_hash: String, // PHC string, salt included
}

impl User {
    pub fn avatar(&self) -> Option<ImageRef> {
        ImageRef::from_columns(self.avatar_url.clone(), self.avatar_filename.clone())
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub token: String,
    pub salt: String,
    pub password_hash: String,
}
