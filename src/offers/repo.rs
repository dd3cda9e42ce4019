use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::query::{OfferFilter, OfferQuery, PriceSort};
use super::repo_types::{NewOffer, Offer, OfferOwnerRow, OfferRow, OfferWithOwner};

const OFFER_COLUMNS: &str = "o.id, o.product_name, o.product_description, o.product_price, \
                             o.brand, o.size, o.condition, o.color, o.city, \
                             o.image_url, o.image_filename, o.owner_id";

const OWNER_COLUMNS: &str = "u.id AS owner_ref, u.username AS owner_username, \
                             u.phone AS owner_phone, u.avatar_url AS owner_avatar_url, \
                             u.avatar_filename AS owner_avatar_filename";

#[async_trait]
pub trait OfferRepo: Send + Sync {
    async fn insert(&self, offer: NewOffer) -> anyhow::Result<Offer>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<OfferWithOwner>>;
    /// One page of matches, owners resolved.
    async fn search(&self, query: &OfferQuery) -> anyhow::Result<Vec<OfferWithOwner>>;
    /// Size of the whole filtered set, ignoring pagination.
    async fn count(&self, filter: &OfferFilter) -> anyhow::Result<i64>;
    /// Overwrites every mutable column of an existing offer.
    async fn save(&self, offer: &Offer) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgOffers {
    db: PgPool,
}

impl PgOffers {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// ILIKE pattern matching `title` literally anywhere in the name.
fn like_pattern(title: &str) -> String {
    let mut escaped = String::with_capacity(title.len() + 2);
    escaped.push('%');
    for c in title.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OfferFilter) {
    qb.push(" WHERE TRUE");
    if let Some(title) = &filter.title {
        qb.push(" AND o.product_name ILIKE ")
            .push_bind(like_pattern(title));
    }
    if let Some(min) = filter.price_min {
        qb.push(" AND o.product_price >= ").push_bind(min);
    }
    if let Some(max) = filter.price_max {
        qb.push(" AND o.product_price <= ").push_bind(max);
    }
}

fn search_sql(query: &OfferQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {OFFER_COLUMNS}, {OWNER_COLUMNS} FROM offers o LEFT JOIN users u ON u.id = o.owner_id"
    ));
    push_filter(&mut qb, &query.filter);
    qb.push(" ORDER BY ");
    match query.sort {
        Some(PriceSort::Asc) => {
            qb.push("o.product_price ASC, ");
        }
        Some(PriceSort::Desc) => {
            qb.push("o.product_price DESC, ");
        }
        None => {}
    }
    qb.push("o.created_at ASC, o.id ASC");
    qb.push(" LIMIT ").push_bind(query.page.limit);
    qb.push(" OFFSET ").push_bind(query.page.skip);
    qb
}

#[async_trait]
impl OfferRepo for PgOffers {
    async fn insert(&self, offer: NewOffer) -> anyhow::Result<Offer> {
        let row = sqlx::query_as::<_, OfferRow>(
            r#"
            INSERT INTO offers AS o (id, product_name, product_description, product_price,
                                     brand, size, condition, color, city, owner_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING o.id, o.product_name, o.product_description, o.product_price,
                      o.brand, o.size, o.condition, o.color, o.city,
                      o.image_url, o.image_filename, o.owner_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&offer.name)
        .bind(&offer.description)
        .bind(offer.price)
        .bind(&offer.details.brand)
        .bind(&offer.details.size)
        .bind(&offer.details.condition)
        .bind(&offer.details.color)
        .bind(&offer.details.city)
        .bind(offer.owner_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.db)
        .await
        .context("insert offer")?;
        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<OfferWithOwner>> {
        let row = sqlx::query_as::<_, OfferOwnerRow>(&format!(
            "SELECT {OFFER_COLUMNS}, {OWNER_COLUMNS} \
             FROM offers o LEFT JOIN users u ON u.id = o.owner_id \
             WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find offer")?;
        Ok(row.map(Into::into))
    }

    async fn search(&self, query: &OfferQuery) -> anyhow::Result<Vec<OfferWithOwner>> {
        let rows = search_sql(query)
            .build_query_as::<OfferOwnerRow>()
            .fetch_all(&self.db)
            .await
            .context("search offers")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: &OfferFilter) -> anyhow::Result<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM offers o");
        push_filter(&mut qb, filter);
        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await
            .context("count offers")?;
        Ok(count)
    }

    async fn save(&self, offer: &Offer) -> anyhow::Result<()> {
        let image_url = offer.image.as_ref().map(|i| i.secure_url.as_str());
        let image_filename = offer.image.as_ref().map(|i| i.original_filename.as_str());
        sqlx::query(
            r#"
            UPDATE offers
               SET product_name = $2, product_description = $3, product_price = $4,
                   brand = $5, size = $6, condition = $7, color = $8, city = $9,
                   image_url = $10, image_filename = $11
             WHERE id = $1
            "#,
        )
        .bind(offer.id)
        .bind(&offer.name)
        .bind(&offer.description)
        .bind(offer.price)
        .bind(&offer.details.brand)
        .bind(&offer.details.size)
        .bind(&offer.details.condition)
        .bind(&offer.details.color)
        .bind(&offer.details.city)
        .bind(image_url)
        .bind(image_filename)
        .execute(&self.db)
        .await
        .context("update offer")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete offer")?;
        Ok(())
    }
}
