use sqlx::FromRow;
use uuid::Uuid;

use crate::images::ImageRef;

/// Free-form attributes, always rendered in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferDetails {
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub color: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Offer {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub details: OfferDetails,
    pub image: Option<ImageRef>,
    pub owner_id: Uuid,
}

/// Public side of the account owning an offer.
#[derive(Debug, Clone)]
pub struct Owner {
    pub id: Uuid,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<ImageRef>,
}

/// An offer with its owner resolved; `owner` is `None` when the reference dangles.
#[derive(Debug, Clone)]
pub struct OfferWithOwner {
    pub offer: Offer,
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub details: OfferDetails,
    pub owner_id: Uuid,
}

#[derive(Debug, FromRow)]
pub struct OfferRow {
    pub id: Uuid,
    pub product_name: String,
    pub product_description: String,
    pub product_price: f64,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub color: Option<String>,
    pub city: Option<String>,
    pub image_url: Option<String>,
    pub image_filename: Option<String>,
    pub owner_id: Uuid,
}

/// `offers LEFT JOIN users`, owner columns prefixed.
#[derive(Debug, FromRow)]
pub struct OfferOwnerRow {
    #[sqlx(flatten)]
    pub offer: OfferRow,
    pub owner_ref: Option<Uuid>,
    pub owner_username: Option<String>,
    pub owner_phone: Option<String>,
    pub owner_avatar_url: Option<String>,
    pub owner_avatar_filename: Option<String>,
}

impl From<OfferRow> for Offer {
    fn from(r: OfferRow) -> Self {
        Self {
            id: r.id,
            name: r.product_name,
            description: r.product_description,
            price: r.product_price,
            details: OfferDetails {
                brand: r.brand,
                size: r.size,
                condition: r.condition,
                color: r.color,
                city: r.city,
            },
            image: ImageRef::from_columns(r.image_url, r.image_filename),
            owner_id: r.owner_id,
        }
    }
}

impl From<OfferOwnerRow> for OfferWithOwner {
    fn from(r: OfferOwnerRow) -> Self {
        let owner = r.owner_ref.map(|id| Owner {
            id,
            username: r.owner_username,
            phone: r.owner_phone,
            avatar: ImageRef::from_columns(r.owner_avatar_url, r.owner_avatar_filename),
        });
        Self {
            offer: r.offer.into(),
            owner,
        }
    }
}
