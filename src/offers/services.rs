use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::form::{FormData, PatchForm, UploadedFile};
use crate::images::services::{offer_image_key, offer_prefix, upload_image};
use crate::offers::dto::{OfferView, SearchResponse};
use crate::offers::query::OfferQuery;
use crate::offers::repo_types::{NewOffer, Offer, OfferDetails, OfferWithOwner};
use crate::state::AppState;

pub const MAX_PRICE: f64 = 100_000.0;
pub const MAX_TITLE_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;

pub fn parse_price(raw: &str) -> Result<f64, ApiError> {
    let price = raw
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(invalid_price)?;
    validate_price(price)?;
    Ok(price)
}

pub fn validate_price(price: f64) -> Result<(), ApiError> {
    if (0.0..=MAX_PRICE).contains(&price) {
        Ok(())
    } else {
        Err(invalid_price())
    }
}

fn invalid_price() -> ApiError {
    ApiError::validation("Invalid price, must be set between 0€ - 100.000€")
}

pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "Invalid title, {MAX_TITLE_LEN} characters maximum"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::validation(format!(
            "Invalid description, {MAX_DESCRIPTION_LEN} characters maximum"
        )));
    }
    Ok(())
}

fn details_from_form(form: &FormData) -> OfferDetails {
    OfferDetails {
        brand: form.owned_text("brand"),
        size: form.owned_text("size"),
        condition: form.owned_text("condition"),
        color: form.owned_text("color"),
        city: form.owned_text("city"),
    }
}

/// Validated publish input, owner excluded.
#[derive(Debug, Clone)]
pub struct OfferDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub details: OfferDetails,
}

impl OfferDraft {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let price = parse_price(form.text("price").ok_or_else(invalid_price)?)?;
        let name = form
            .owned_text("title")
            .ok_or_else(|| ApiError::validation("Invalid title, a title is required"))?;
        validate_title(&name)?;
        let description = form
            .owned_text("description")
            .ok_or_else(|| ApiError::validation("Invalid description, a description is required"))?;
        validate_description(&description)?;

        Ok(Self {
            name,
            description,
            price,
            details: details_from_form(form),
        })
    }

    fn owned_by(self, owner_id: Uuid) -> NewOffer {
        NewOffer {
            name: self.name,
            description: self.description,
            price: self.price,
            details: self.details,
            owner_id,
        }
    }
}

/// Partial update: `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub details: OfferDetails,
}

impl OfferPatch {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        let name = form.owned_text("title");
        if let Some(name) = &name {
            validate_title(name)?;
        }
        let description = form.owned_text("description");
        if let Some(description) = &description {
            validate_description(description)?;
        }
        let price = form.text("price").map(parse_price).transpose()?;

        Ok(Self {
            name,
            description,
            price,
            details: details_from_form(form),
        })
    }

    pub fn apply(self, offer: &mut Offer) {
        fn merge<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        fn merge_opt(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        merge(&mut offer.name, self.name);
        merge(&mut offer.description, self.description);
        merge(&mut offer.price, self.price);
        merge_opt(&mut offer.details.brand, self.details.brand);
        merge_opt(&mut offer.details.size, self.details.size);
        merge_opt(&mut offer.details.condition, self.details.condition);
        merge_opt(&mut offer.details.color, self.details.color);
        merge_opt(&mut offer.details.city, self.details.city);
    }
}

/// Gate for modify/delete: the offer must exist, its owner must resolve, and be `user`.
pub fn ensure_owner(user: &User, found: Option<OfferWithOwner>) -> Result<Offer, ApiError> {
    match found {
        Some(OfferWithOwner {
            offer,
            owner: Some(owner),
        }) if owner.id == user.id && offer.owner_id == user.id => Ok(offer),
        Some(found) => {
            warn!(user_id = %user.id, offer_id = %found.offer.id, "offer owned by someone else");
            Err(ApiError::access_denied())
        }
        None => {
            warn!(user_id = %user.id, "offer not found");
            Err(ApiError::access_denied())
        }
    }
}

pub fn parse_offer_id(raw: Option<&str>) -> Option<Uuid> {
    raw.and_then(|id| Uuid::parse_str(id.trim()).ok())
}

async fn owned_offer(state: &AppState, user: &User, raw_id: Option<&str>) -> Result<Offer, ApiError> {
    let found = match parse_offer_id(raw_id) {
        Some(id) => state.offers.find(id).await?,
        None => None,
    };
    ensure_owner(user, found)
}

pub async fn search_offers(state: &AppState, query: &OfferQuery) -> Result<SearchResponse, ApiError> {
    let offers = state.offers.search(query).await?;
    let count = state.offers.count(&query.filter).await?;
    Ok(SearchResponse {
        count,
        offers: offers.into_iter().map(OfferView::from).collect(),
    })
}

pub async fn offer_detail(state: &AppState, raw_id: &str) -> Result<OfferView, ApiError> {
    let found = match parse_offer_id(Some(raw_id)) {
        Some(id) => state.offers.find(id).await?,
        None => None,
    };
    found
        .map(OfferView::from)
        .ok_or_else(|| ApiError::NotFound("inexistent offer".into()))
}

/// Persists the offer, then attaches the picture under a key derived from its id.
pub async fn publish_offer(
    state: &AppState,
    owner: &User,
    draft: OfferDraft,
    picture: Option<UploadedFile>,
) -> Result<Offer, ApiError> {
    let mut offer = state.offers.insert(draft.owned_by(owner.id)).await?;

    if let Some(file) = picture {
        let image = upload_image(state.storage.as_ref(), &offer_image_key(offer.id), file).await?;
        offer.image = Some(image);
        state.offers.save(&offer).await?;
    }

    info!(offer_id = %offer.id, owner_id = %owner.id, "offer published");
    Ok(offer)
}

pub async fn modify_offer(
    state: &AppState,
    user: &User,
    raw_id: Option<&str>,
    body: PatchForm,
) -> Result<(), ApiError> {
    let mut offer = owned_offer(state, user, raw_id).await?;
    let mut form = body.into_form()?;
    let patch = OfferPatch::from_form(&form)?;

    if let Some(file) = form.take_file("picture") {
        let image = upload_image(state.storage.as_ref(), &offer_image_key(offer.id), file).await?;
        offer.image = Some(image);
    }
    patch.apply(&mut offer);
    state.offers.save(&offer).await?;

    info!(offer_id = %offer.id, "offer modified");
    Ok(())
}

/// Assets first, then the record. A failed asset cleanup does not stop the record removal.
pub async fn delete_offer(state: &AppState, user: &User, raw_id: Option<&str>) -> Result<(), ApiError> {
    let offer = owned_offer(state, user, raw_id).await?;

    if let Err(e) = state.storage.delete_prefix(&offer_prefix(offer.id)).await {
        warn!(error = %e, offer_id = %offer.id, "offer assets not removed");
    }
    state.offers.delete(offer.id).await?;

    info!(offer_id = %offer.id, "offer deleted");
    Ok(())
}
