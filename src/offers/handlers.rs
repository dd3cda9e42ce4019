use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, DefaultBodyLimit, Multipart,
        Path, Query, State,
    },
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{IdQuery, OfferView, PublishedOffer, SearchResponse};
use super::query::{OfferQuery, SearchParams};
use super::services::{self, OfferDraft};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, MessageResponse},
    form::{FormData, PatchForm},
    state::AppState,
};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(search_offers))
        .route("/offer/:id", get(get_offer))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/offer/publish", post(publish_offer))
        .route("/offers/modify", put(modify_offer))
        .route("/offers/delete", delete(delete_offer))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

// --- handlers ---

/// GET /offers?title=&priceMin=&priceMax=&sort=&limit=&page=
#[instrument(skip(state))]
pub async fn search_offers(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let query = OfferQuery::from_params(&params)?;
    Ok(Json(services::search_offers(&state, &query).await?))
}

#[instrument(skip(state))]
pub async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OfferView>, ApiError> {
    Ok(Json(services::offer_detail(&state, &id).await?))
}

/// POST /offer/publish (multipart)
/// Fields: title, description, price, brand, size, condition, color, city; file: picture
#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn publish_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<PublishedOffer>, ApiError> {
    let mut form = FormData::from_multipart(mp?).await?;
    let draft = OfferDraft::from_form(&form)?;
    let picture = form.take_file("picture");

    let offer = services::publish_offer(&state, &user, draft, picture).await?;
    Ok(Json(PublishedOffer::new(offer, &user)))
}

/// PUT /offers/modify?id= (multipart or JSON, every field optional)
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn modify_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    q: Result<Query<IdQuery>, QueryRejection>,
    body: PatchForm,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(q) = q?;
    services::modify_offer(&state, &user, q.id.as_deref(), body).await?;
    Ok(MessageResponse::new("Offer successfully modified"))
}

/// DELETE /offers/delete?id=
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    q: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(q) = q?;
    services::delete_offer(&state, &user, q.id.as_deref()).await?;
    Ok(MessageResponse::new("Offer successfully deleted"))
}
