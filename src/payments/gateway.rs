use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::PaymentConfig;

/// One charge, amount already in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub source: String,
    pub amount: i64,
    pub description: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the gateway's status for the created charge, e.g. `succeeded`.
    async fn charge(&self, charge: &Charge) -> anyhow::Result<String>;
}

/// Stripe-compatible `/v1/charges` client.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret: String,
    api_base: String,
    currency: String,
}

impl StripeGateway {
    pub fn new(cfg: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret: cfg.secret.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            currency: cfg.currency.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChargeBody {
    status: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    message: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(&self, charge: &Charge) -> anyhow::Result<String> {
        let amount = charge.amount.to_string();
        let res = self
            .client
            .post(format!("{}/v1/charges", self.api_base))
            .bearer_auth(&self.secret)
            .form(&[
                ("source", charge.source.as_str()),
                ("amount", amount.as_str()),
                ("currency", self.currency.as_str()),
                ("description", charge.description.as_str()),
            ])
            .send()
            .await
            .context("payment gateway request")?;

        let status = res.status();
        if !status.is_success() {
            let message = match res.json::<GatewayErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("payment gateway returned {status}"),
            };
            anyhow::bail!(message);
        }

        let body = res
            .json::<ChargeBody>()
            .await
            .context("payment gateway response")?;
        debug!(status = %body.status, amount = charge.amount, "charge created");
        Ok(body.status)
    }
}
