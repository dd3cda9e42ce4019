use crate::auth::repo::{PgUsers, UserRepo};
use crate::config::AppConfig;
use crate::offers::repo::{OfferRepo, PgOffers};
use crate::payments::gateway::{PaymentGateway, StripeGateway};
use crate::storage::{Storage, StorageClient};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub offers: Arc<dyn OfferRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Connects every backing service; also hands back the pool for migrations.
    pub async fn init() -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;
        let payments = Arc::new(StripeGateway::new(&config.payment)) as Arc<dyn PaymentGateway>;

        let state = Self {
            users: Arc::new(PgUsers::new(db.clone())),
            offers: Arc::new(PgOffers::new(db.clone())),
            config,
            storage,
            payments,
        };
        Ok((state, db))
    }
}
