use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::dto::PublicAccount;
use crate::auth::repo_types::User;
use crate::images::ImageRef;
use crate::offers::repo_types::{Offer, OfferDetails, OfferWithOwner, Owner};

/// One `{ "<KEY>": value }` entry of `product_details`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub key: &'static str,
    pub value: Option<String>,
}

impl Serialize for DetailRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.value)?;
        map.end()
    }
}

pub fn detail_records(details: &OfferDetails) -> Vec<DetailRecord> {
    [
        ("MARQUE", &details.brand),
        ("TAILLE", &details.size),
        ("ÉTAT", &details.condition),
        ("COULEUR", &details.color),
        ("EMPLACEMENT", &details.city),
    ]
    .into_iter()
    .map(|(key, value)| DetailRecord {
        key,
        value: value.clone(),
    })
    .collect()
}

#[derive(Debug, Serialize)]
pub struct OwnerView {
    pub account: PublicAccount,
    #[serde(rename = "_id")]
    pub id: Uuid,
}

impl From<Owner> for OwnerView {
    fn from(owner: Owner) -> Self {
        Self {
            account: PublicAccount {
                username: owner.username,
                phone: owner.phone,
                avatar: owner.avatar,
            },
            id: owner.id,
        }
    }
}

impl From<&User> for OwnerView {
    fn from(user: &User) -> Self {
        Self {
            account: PublicAccount::from(user),
            id: user.id,
        }
    }
}

/// Projection used by search and detail.
#[derive(Debug, Serialize)]
pub struct OfferView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub product_name: String,
    pub product_price: f64,
    pub product_details: Vec<DetailRecord>,
    pub product_image: Option<ImageRef>,
    pub owner: Option<OwnerView>,
}

impl From<OfferWithOwner> for OfferView {
    fn from(found: OfferWithOwner) -> Self {
        let OfferWithOwner { offer, owner } = found;
        Self {
            id: offer.id,
            product_details: detail_records(&offer.details),
            product_name: offer.name,
            product_price: offer.price,
            product_image: offer.image,
            owner: owner.map(Into::into),
        }
    }
}

/// Answer to a successful publish.
#[derive(Debug, Serialize)]
pub struct PublishedOffer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub product_name: String,
    pub product_description: String,
    pub product_price: f64,
    pub product_details: Vec<DetailRecord>,
    pub owner: OwnerView,
    pub product_image: Option<ImageRef>,
}

impl PublishedOffer {
    pub fn new(offer: Offer, owner: &User) -> Self {
        Self {
            id: offer.id,
            product_details: detail_records(&offer.details),
            product_name: offer.name,
            product_description: offer.description,
            product_price: offer.price,
            owner: OwnerView::from(owner),
            product_image: offer.image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: i64,
    pub offers: Vec<OfferView>,
}

/// `?id=` of the guarded mutation routes.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}
