//! Chain gateway for the prediction market and its payment token.
//!
//! This module handles:
//! - Read/write traits over the market and token contracts
//! - JSON-RPC implementation backed by alloy
//! - In-memory mock for testing

pub mod mock;
pub mod rpc;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::error::ChainError;
use crate::market::{Market, MarketOption, SharesBalance, TokenBalance};

pub use mock::{ChainCall, MockChain, MockConfig};
pub use rpc::RpcChain;

/// Read side of the market and token contracts.
#[async_trait]
pub trait MarketReader: Send + Sync {
    /// Address of the market contract (the token spender).
    fn market_address(&self) -> Address;

    /// Number of markets; ids run `0..count`.
    async fn market_count(&self) -> Result<u64, ChainError>;

    /// Snapshot of one market.
    async fn market_info(&self, market_id: u64) -> Result<Market, ChainError>;

    /// A user's shares in one market.
    async fn shares_balance(&self, market_id: u64, user: Address)
        -> Result<SharesBalance, ChainError>;

    /// Token allowance `owner` has granted to `spender`.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError>;

    /// Token balance of `account`.
    async fn token_balance(&self, account: Address) -> Result<TokenBalance, ChainError>;
}

/// Write side used by the connected wallet. Every call waits for the receipt.
#[async_trait]
pub trait MarketWriter: Send + Sync {
    /// Token `approve(spender, amount)`.
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError>;

    /// Market `buyShares(marketId, isOptionA, amount)`.
    async fn buy_shares(
        &self,
        market_id: u64,
        option: MarketOption,
        amount: U256,
    ) -> Result<TxHash, ChainError>;

    /// Market `claimWinnings(marketId)`.
    async fn claim_winnings(&self, market_id: u64) -> Result<TxHash, ChainError>;
}

/// Privileged token mint used by the faucet.
#[async_trait]
pub trait TokenMinter: Send + Sync {
    /// Token `mintTo(recipient, amount)`, waiting for the receipt.
    async fn mint_to(&self, recipient: Address, amount: U256) -> Result<TxHash, ChainError>;
}
