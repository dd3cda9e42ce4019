use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::repo_types::User;
use super::services::resolve_user;
use crate::error::ApiError;
use crate::state::AppState;

const UNAUTHORIZED: &str = "unauthorized access, you have to be logged in to access this page";

/// Resolves the bearer token to the account behind it.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized(UNAUTHORIZED))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized(UNAUTHORIZED))?;

        match resolve_user(state.users.as_ref(), token).await? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                warn!("unknown bearer token");
                Err(ApiError::unauthorized(UNAUTHORIZED))
            }
        }
    }
}
