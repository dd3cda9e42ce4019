use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::gateway::Charge;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub token: String,
    pub amount: f64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub status: String,
}

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/payment", post(pay))
}

/// Amount in major units to minor units, rejecting anything that cannot be charged.
pub fn to_minor_units(amount: f64) -> Result<i64, ApiError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::validation("amount must be a positive number"));
    }
    Ok((amount * 100.0).round() as i64)
}

impl PaymentRequest {
    fn into_charge(self) -> Result<Charge, ApiError> {
        if self.token.trim().is_empty() {
            return Err(ApiError::validation("payment token is required"));
        }
        Ok(Charge {
            amount: to_minor_units(self.amount)?,
            source: self.token,
            description: format!("payment for item: {}", self.title),
        })
    }
}

#[instrument(skip(state, payload))]
pub async fn pay(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let Json(payload) = payload?;
    let charge = payload.into_charge()?;
    let status = state.payments.charge(&charge).await?;
    info!(amount = charge.amount, status = %status, "payment charged");
    Ok(Json(PaymentResponse { status }))
}
