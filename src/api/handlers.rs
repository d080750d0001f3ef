//! HTTP API handlers.

use std::sync::Arc;

use alloy::primitives::U256;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use super::types::{ClaimTokenRequest, ClaimTokenResponse, ErrorResponse, HealthResponse};
use crate::chain::TokenMinter;
use crate::error::ValidationError;
use crate::metrics;
use crate::signing::parse_address;

/// Success message of the faucet endpoint.
pub const CLAIM_SUCCESS: &str = "Tokens successfully claimed!";
/// Error text of a failed mint.
pub const CLAIM_FAILURE: &str = "Failed to claim tokens";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Signer-backed token minter.
    pub minter: Arc<dyn TokenMinter>,
    /// Base units minted per claim.
    pub mint_amount: U256,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<metrics_exporter_prometheus::PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(minter: Arc<dyn TokenMinter>, mint_amount: U256) -> Self {
        Self {
            minter,
            mint_amount,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: metrics_exporter_prometheus::PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}

/// Faucet handler: validate the address, mint, wait for the receipt.
///
/// The body is read as JSON whatever its `Content-Type`; browsers posting a
/// bare string send `text/plain`. Malformed bodies are answered like an
/// invalid address.
pub async fn claim_token(State(state): State<AppState>, body: Bytes) -> Response {
    let recipient = match serde_json::from_slice::<ClaimTokenRequest>(&body)
        .map_err(|e| {
            warn!(error = %e, "Rejected faucet body");
            ValidationError::InvalidAddress
        })
        .and_then(|req| parse_address(&req.address))
    {
        Ok(address) => address,
        Err(e) => {
            metrics::inc_faucet_requests("invalid");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string(), None);
        }
    };

    let timer = metrics::timer_mint();
    let result = state.minter.mint_to(recipient, state.mint_amount).await;
    drop(timer);

    match result {
        Ok(tx_hash) => {
            metrics::inc_faucet_requests("ok");
            metrics::inc_mints();
            info!(recipient = %recipient, tx_hash = %tx_hash, "Tokens minted");

            Json(ClaimTokenResponse {
                message: CLAIM_SUCCESS.to_string(),
                transaction_hash: tx_hash.to_string(),
            })
            .into_response()
        }
        Err(e) => {
            metrics::inc_faucet_requests("error");
            metrics::inc_transactions_failed("mint");
            error!(recipient = %recipient, error = %e, "Mint failed");

            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                CLAIM_FAILURE,
                Some(e.to_string()),
            )
        }
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prometheus exposition; 404 when no recorder is installed.
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
