//! Claiming: winnings from a resolved market and test tokens from the faucet.

use std::time::Duration;

use alloy::primitives::TxHash;
use tracing::{info, instrument, warn};

use super::notification::Notification;
use crate::api::types::{ClaimTokenRequest, ClaimTokenResponse, ErrorResponse};
use crate::chain::MarketWriter;
use crate::error::{ChainError, ClaimError};
use crate::market::Session;
use crate::metrics;

/// Fallback text when the faucet answers with an empty error.
pub const FAUCET_FAILURE: &str = "Failed to claim tokens";

/// Submit `claimWinnings(marketId)` for a resolved market.
///
/// Eligibility is decided by the contract; a revert comes back as an error.
#[instrument(skip(writer))]
pub async fn claim_winnings<W>(writer: &W, market_id: u64) -> Result<TxHash, ChainError>
where
    W: MarketWriter + ?Sized,
{
    match writer.claim_winnings(market_id).await {
        Ok(tx_hash) => {
            metrics::inc_winnings_claims();
            info!(tx_hash = %tx_hash, "Winnings claimed");
            Ok(tx_hash)
        }
        Err(e) => {
            metrics::inc_transactions_failed("claim_winnings");
            warn!(error = %e, "Winnings claim failed");
            Err(e)
        }
    }
}

/// Toast for a winnings claim result.
pub fn winnings_notification(result: &Result<TxHash, ChainError>) -> Notification {
    match result {
        Ok(_) => Notification::info("Rewards Claimed!", "Your winnings have been claimed."),
        Err(e) => Notification::destructive("Claim Failed", e.to_string()),
    }
}

/// Client for the faucet endpoint.
#[derive(Debug, Clone)]
pub struct FaucetClient {
    http: reqwest::Client,
    base_url: String,
}

impl FaucetClient {
    /// Create a client for a faucet served at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClaimError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/api/claimToken", self.base_url)
    }

    /// Ask the faucet to mint tokens to the session's account.
    ///
    /// Returns the mint transaction hash reported by the faucet.
    #[instrument(skip(self, session))]
    pub async fn claim(&self, session: &Session) -> Result<String, ClaimError> {
        let Some(account) = session.account else {
            return Err(ClaimError::Rejected("Wallet not connected".to_string()));
        };

        let response = self
            .http
            .post(self.endpoint())
            .json(&ClaimTokenRequest {
                address: account.to_checksum(None),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed: ClaimTokenResponse = serde_json::from_str(&body)
                .map_err(|e| ClaimError::Rejected(format!("unexpected faucet response: {}", e)))?;
            info!(tx_hash = %parsed.transaction_hash, "Faucet claim confirmed");
            Ok(parsed.transaction_hash)
        } else {
            let message = rejection_message(&body);
            warn!(%status, error = %message, "Faucet claim rejected");
            Err(ClaimError::Rejected(message))
        }
    }
}

/// Pull the most specific message out of a faucet error body.
pub fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            details: Some(details),
            ..
        }) if !details.is_empty() => details,
        Ok(ErrorResponse { error, .. }) if !error.is_empty() => error,
        _ => FAUCET_FAILURE.to_string(),
    }
}

/// Toast for a faucet claim result.
pub fn faucet_notification(result: &Result<String, ClaimError>) -> Notification {
    match result {
        Ok(_) => Notification::info(
            "Tokens Claimed!",
            "Your tokens have been successfully claimed.",
        ),
        Err(e) => Notification::destructive("Claim Failed", e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainCall, MockChain, MockConfig};
    use alloy::primitives::Address;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn claim_winnings_records_call() {
        let chain = MockChain::new(Address::repeat_byte(0x11));

        let result = claim_winnings(&chain, 4).await;

        assert!(result.is_ok());
        assert_eq!(chain.calls(), vec![ChainCall::ClaimWinnings { market_id: 4 }]);
        assert_eq!(winnings_notification(&result).title, "Rewards Claimed!");
    }

    #[tokio::test]
    async fn claim_winnings_failure_maps_to_toast() {
        let chain = MockChain::with_config(
            Address::repeat_byte(0x11),
            MockConfig {
                fail_claim: true,
                ..Default::default()
            },
        );

        let result = claim_winnings(&chain, 0).await;
        let toast = winnings_notification(&result);

        assert_eq!(toast.title, "Claim Failed");
        assert_eq!(toast.description, "Mock claim failure");
    }

    #[test]
    fn rejection_prefers_details() {
        let body = r#"{"error":"Failed to claim tokens","details":"nonce too low"}"#;
        assert_eq!(
            rejection_message(body),
            "nonce too low"
        );

        let body = r#"{"error":"Invalid Ethereum address"}"#;
        assert_eq!(
            rejection_message(body),
            "Invalid Ethereum address"
        );

        assert_eq!(rejection_message("<html>"), FAUCET_FAILURE);
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = FaucetClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/claimToken");
    }

    #[tokio::test]
    async fn claim_requires_connected_wallet() {
        let client = FaucetClient::new("http://localhost:3000").unwrap();
        let err = client.claim(&Session::disconnected()).await.unwrap_err();
        assert_eq!(
            faucet_notification(&Err(err)).description,
            "Wallet not connected"
        );
    }

    #[test]
    fn faucet_success_toast() {
        let toast = faucet_notification(&Ok("0xabc".to_string()));
        assert_eq!(toast.title, "Tokens Claimed!");
        assert_eq!(toast.description, "Your tokens have been successfully claimed.");
    }
}
