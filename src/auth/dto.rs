use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::images::ImageRef;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of an account, safe to show next to any offer.
#[derive(Debug, Clone, Serialize)]
pub struct PublicAccount {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<ImageRef>,
}

impl From<&User> for PublicAccount {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            phone: user.phone.clone(),
            avatar: user.avatar(),
        }
    }
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub token: String,
    pub account: PublicAccount,
}

impl From<&User> for AuthResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            token: user.token.clone(),
            account: PublicAccount::from(user),
        }
    }
}
