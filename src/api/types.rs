//! JSON bodies of the faucet endpoint.

use serde::{Deserialize, Serialize};

/// `POST /api/claimToken` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimTokenRequest {
    /// Recipient address.
    pub address: String,
}

/// Successful claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimTokenResponse {
    /// Always `Tokens successfully claimed!`.
    pub message: String,
    /// Mint transaction hash.
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
}

/// Failed claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Short error text.
    pub error: String,
    /// Underlying failure, on server errors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}
