use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    extract::rejection::JsonRejection,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest},
        repo_types::NewUser,
        services::{generate_token, hash_password, is_valid_email, verify_password},
    },
    error::ApiError,
    form::FormData,
    images::services::{avatar_key, upload_image},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// POST /user/signup (multipart): email, username, phone, password, avatar
#[instrument(skip(state, mp))]
pub async fn signup(
    State(state): State<AppState>,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let mut form = FormData::from_multipart(mp?).await?;

    let email = form.text("email").unwrap_or_default().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::validation(
            "Valid email is needed for account creation",
        ));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::validation(
            "This email is already associated with an account",
        ));
    }

    let password = form
        .text("password")
        .ok_or_else(|| ApiError::validation("Password is required"))?;
    let digest = hash_password(password)?;

    let mut user = state
        .users
        .create(NewUser {
            email,
            username: form.owned_text("username"),
            phone: form.owned_text("phone"),
            token: generate_token(),
            salt: digest.salt,
            password_hash: digest.hash,
        })
        .await?;

    // the storage key needs the freshly assigned id
    if let Some(file) = form.take_file("avatar") {
        let avatar = upload_image(state.storage.as_ref(), &avatar_key(user.id), file).await?;
        state.users.set_avatar(user.id, &avatar).await?;
        user.avatar_url = Some(avatar.secure_url);
        user.avatar_filename = Some(avatar.original_filename);
    }

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse::from(&user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let email = payload.email.trim().to_lowercase();

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::unauthorized("invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse::from(&user)))
}
