//! JSON-RPC chain client built on alloy.

use alloy::network::{Ethereum, EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{MarketReader, MarketWriter, TokenMinter};
use crate::config::Config;
use crate::error::ChainError;
use crate::market::{Market, MarketOption, Outcome, SharesBalance, TokenBalance};
use crate::signing::{create_signer, parse_address};

sol! {
    #[sol(rpc)]
    interface IPredictionMarket {
        function marketCount() external view returns (uint256);
        function getMarketInfo(uint256 _marketId) external view returns (
            string question,
            string optionA,
            string optionB,
            uint256 endTime,
            uint8 outcome,
            uint256 totalOptionAShares,
            uint256 totalOptionBShares,
            bool resolved
        );
        function getSharesBalance(uint256 _marketId, address _user) external view returns (
            uint256 optionAShares,
            uint256 optionBShares
        );
        function buyShares(uint256 _marketId, bool _isOptionA, uint256 _amount) external;
        function claimWinnings(uint256 _marketId) external;
    }

    #[sol(rpc)]
    interface IPredictionToken {
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function approve(address spender, uint256 amount) external returns (bool);
        function mintTo(address to, uint256 amount) external;
    }
}

/// Symbol shown when the token does not report one.
const FALLBACK_SYMBOL: &str = "PMT";

/// Chain client for the market and token contracts.
#[derive(Clone)]
pub struct RpcChain {
    /// Type-erased provider (carries the wallet filler when a key is set).
    provider: DynProvider,
    /// Market contract address.
    market: Address,
    /// Token contract address.
    token: Address,
    /// Address of the signing key, if writes are enabled.
    signer: Option<Address>,
}

impl std::fmt::Debug for RpcChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChain")
            .field("market", &self.market)
            .field("token", &self.token)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl RpcChain {
    /// Connect to `rpc_url`. Writes are enabled only when a key is given.
    pub fn connect(
        rpc_url: &str,
        market: Address,
        token: Address,
        private_key: Option<&str>,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| ChainError::Setup(format!("invalid RPC_URL: {}", e)))?;

        let (provider, signer) = match private_key {
            Some(key) => {
                let signer = create_signer(key)?;
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Some(address))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };

        debug!(market = %market, token = %token, signer = ?signer, "Chain client created");

        Ok(Self {
            provider,
            market,
            token,
            signer,
        })
    }

    /// Connect with the server signing key and contract addresses from config.
    pub fn from_config(config: &Config) -> Result<Self, ChainError> {
        let market = parse_address(&config.market_address)
            .map_err(|_| ChainError::Setup("invalid MARKET_ADDRESS".to_string()))?;
        let token = parse_address(&config.token_address)
            .map_err(|_| ChainError::Setup("invalid TOKEN_ADDRESS".to_string()))?;

        let key = config.server_key().map_err(ChainError::Setup)?;

        Self::connect(&config.rpc_url, market, token, Some(key))
    }

    /// Address of the signing key, if any.
    pub fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    fn require_signer(&self) -> Result<Address, ChainError> {
        self.signer.ok_or(ChainError::NoSigner)
    }

    fn market_contract(&self) -> IPredictionMarket::IPredictionMarketInstance<DynProvider> {
        IPredictionMarket::new(self.market, self.provider.clone())
    }

    fn token_contract(&self) -> IPredictionToken::IPredictionTokenInstance<DynProvider> {
        IPredictionToken::new(self.token, self.provider.clone())
    }
}

/// Wait for a sent transaction and fail on a reverted receipt.
async fn wait_for_receipt(
    pending: PendingTransactionBuilder<Ethereum>,
) -> Result<TxHash, ChainError> {
    let tx_hash = *pending.tx_hash();
    debug!(tx_hash = %tx_hash, "Waiting for receipt");

    let receipt = pending.get_receipt().await.map_err(|e| ChainError::Reverted {
        tx_hash: tx_hash.to_string(),
        reason: e.to_string(),
    })?;

    if !receipt.status() {
        warn!(tx_hash = %tx_hash, "Transaction reverted");
        return Err(ChainError::Reverted {
            tx_hash: tx_hash.to_string(),
            reason: "execution reverted".to_string(),
        });
    }

    Ok(receipt.transaction_hash)
}

fn call_error(e: impl std::fmt::Display) -> ChainError {
    ChainError::Call(e.to_string())
}

#[async_trait]
impl MarketReader for RpcChain {
    fn market_address(&self) -> Address {
        self.market
    }

    #[instrument(skip(self))]
    async fn market_count(&self) -> Result<u64, ChainError> {
        let count = self
            .market_contract()
            .marketCount()
            .call()
            .await
            .map_err(call_error)?;

        u64::try_from(count).map_err(|_| ChainError::Call(format!("market count out of range: {}", count)))
    }

    #[instrument(skip(self))]
    async fn market_info(&self, market_id: u64) -> Result<Market, ChainError> {
        let info = self
            .market_contract()
            .getMarketInfo(U256::from(market_id))
            .call()
            .await
            .map_err(call_error)?;

        Ok(Market {
            question: info.question,
            option_a: info.optionA,
            option_b: info.optionB,
            end_time: u64::try_from(info.endTime).unwrap_or(u64::MAX),
            outcome: Outcome::from_u8(info.outcome),
            total_option_a_shares: info.totalOptionAShares,
            total_option_b_shares: info.totalOptionBShares,
            resolved: info.resolved,
        })
    }

    #[instrument(skip(self))]
    async fn shares_balance(
        &self,
        market_id: u64,
        user: Address,
    ) -> Result<SharesBalance, ChainError> {
        let balance = self
            .market_contract()
            .getSharesBalance(U256::from(market_id), user)
            .call()
            .await
            .map_err(call_error)?;

        Ok(SharesBalance {
            option_a_shares: balance.optionAShares,
            option_b_shares: balance.optionBShares,
        })
    }

    #[instrument(skip(self))]
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError> {
        self.token_contract()
            .allowance(owner, spender)
            .call()
            .await
            .map_err(call_error)
    }

    #[instrument(skip(self))]
    async fn token_balance(&self, account: Address) -> Result<TokenBalance, ChainError> {
        let token = self.token_contract();
        let balance_call = token.balanceOf(account);
        let symbol_call = token.symbol();
        let decimals_call = token.decimals();

        let (value, symbol, decimals) = tokio::join!(
            balance_call.call(),
            symbol_call.call(),
            decimals_call.call(),
        );

        Ok(TokenBalance {
            value: value.map_err(call_error)?,
            symbol: symbol
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| FALLBACK_SYMBOL.to_string()),
            decimals: decimals.unwrap_or(crate::market::units::TOKEN_DECIMALS),
        })
    }
}

#[async_trait]
impl MarketWriter for RpcChain {
    #[instrument(skip(self))]
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.require_signer()?;

        let pending = self
            .token_contract()
            .approve(spender, amount)
            .send()
            .await
            .map_err(call_error)?;

        let tx_hash = wait_for_receipt(pending).await?;
        info!(tx_hash = %tx_hash, "Approval confirmed");
        Ok(tx_hash)
    }

    #[instrument(skip(self))]
    async fn buy_shares(
        &self,
        market_id: u64,
        option: MarketOption,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        self.require_signer()?;

        let pending = self
            .market_contract()
            .buyShares(U256::from(market_id), option.is_option_a(), amount)
            .send()
            .await
            .map_err(call_error)?;

        let tx_hash = wait_for_receipt(pending).await?;
        info!(tx_hash = %tx_hash, "Purchase confirmed");
        Ok(tx_hash)
    }

    #[instrument(skip(self))]
    async fn claim_winnings(&self, market_id: u64) -> Result<TxHash, ChainError> {
        self.require_signer()?;

        let pending = self
            .market_contract()
            .claimWinnings(U256::from(market_id))
            .send()
            .await
            .map_err(call_error)?;

        let tx_hash = wait_for_receipt(pending).await?;
        info!(tx_hash = %tx_hash, "Winnings claimed");
        Ok(tx_hash)
    }
}

#[async_trait]
impl TokenMinter for RpcChain {
    #[instrument(skip(self))]
    async fn mint_to(&self, recipient: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.require_signer()?;

        let pending = self
            .token_contract()
            .mintTo(recipient, amount)
            .send()
            .await
            .map_err(call_error)?;

        wait_for_receipt(pending).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[tokio::test]
    async fn connect_without_key_disables_writes() {
        let chain = RpcChain::connect(
            "http://localhost:8545",
            Address::ZERO,
            Address::ZERO,
            None,
        )
        .unwrap();

        assert_eq!(chain.signer_address(), None);
        let result = chain.approve(Address::ZERO, U256::from(1u64)).await;
        assert!(matches!(result, Err(ChainError::NoSigner)));
    }

    #[test]
    fn connect_with_key_exposes_signer() {
        let chain =
            RpcChain::connect("http://localhost:8545", Address::ZERO, Address::ZERO, Some(KEY))
                .unwrap();

        assert!(chain.signer_address().is_some());
    }

    #[test]
    fn connect_rejects_bad_url() {
        let result = RpcChain::connect("not a url", Address::ZERO, Address::ZERO, None);
        assert!(matches!(result, Err(ChainError::Setup(_))));
    }
}
