//! Mock chain for unit testing.
//!
//! This module provides an in-memory stand-in for the market and token
//! contracts so workflows and handlers can be tested without a node.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;

use super::{MarketReader, MarketWriter, TokenMinter};
use crate::error::ChainError;
use crate::market::{Market, MarketOption, SharesBalance, TokenBalance};

/// Configuration for mock chain behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail every read.
    pub fail_reads: bool,
    /// Whether to fail approvals.
    pub fail_approve: bool,
    /// Whether to fail purchases.
    pub fail_buy: bool,
    /// Whether to fail winnings claims.
    pub fail_claim: bool,
    /// Whether to fail mints.
    pub fail_mint: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// A write recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    /// `approve(spender, amount)`.
    Approve {
        /// Spender.
        spender: Address,
        /// Amount in base units.
        amount: U256,
    },
    /// `buyShares(marketId, isOptionA, amount)`.
    BuyShares {
        /// Market id.
        market_id: u64,
        /// Option bought.
        option: MarketOption,
        /// Amount in base units.
        amount: U256,
    },
    /// `claimWinnings(marketId)`.
    ClaimWinnings {
        /// Market id.
        market_id: u64,
    },
    /// `mintTo(recipient, amount)`.
    MintTo {
        /// Recipient.
        recipient: Address,
        /// Amount in base units.
        amount: U256,
    },
}

#[derive(Debug, Default)]
struct MockState {
    markets: Vec<Market>,
    shares: HashMap<(u64, Address), SharesBalance>,
    allowances: HashMap<(Address, Address), U256>,
    balances: HashMap<Address, U256>,
    calls: Vec<ChainCall>,
    nonce: u64,
}

/// Mock market and token contracts.
#[derive(Debug, Clone)]
pub struct MockChain {
    /// Mock configuration.
    config: MockConfig,
    /// Account that sends writes.
    sender: Address,
    /// Market contract address.
    market: Address,
    /// Shared contract state.
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    /// Market contract address used by the mock.
    pub const MARKET_ADDRESS: Address = Address::new([0x4d; 20]);

    /// Create a mock whose writes are sent from `sender`.
    pub fn new(sender: Address) -> Self {
        Self::with_config(sender, MockConfig::default())
    }

    /// Create a mock with custom configuration.
    pub fn with_config(sender: Address, config: MockConfig) -> Self {
        Self {
            config,
            sender,
            market: Self::MARKET_ADDRESS,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Replace the failure switches, keeping contract state.
    pub fn set_config(&mut self, config: MockConfig) {
        self.config = config;
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a market; returns its id.
    pub fn add_market(&self, market: Market) -> u64 {
        let mut state = self.state();
        state.markets.push(market);
        (state.markets.len() - 1) as u64
    }

    /// Set a user's shares in a market.
    pub fn set_shares(&self, market_id: u64, user: Address, shares: SharesBalance) {
        self.state().shares.insert((market_id, user), shares);
    }

    /// Set the allowance `owner` has granted to `spender`.
    pub fn set_allowance(&self, owner: Address, spender: Address, amount: U256) {
        self.state().allowances.insert((owner, spender), amount);
    }

    /// Set a token balance.
    pub fn set_balance(&self, account: Address, amount: U256) {
        self.state().balances.insert(account, amount);
    }

    /// Writes recorded so far.
    pub fn calls(&self) -> Vec<ChainCall> {
        self.state().calls.clone()
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    fn check_reads(&self) -> Result<(), ChainError> {
        if self.config.fail_reads {
            return Err(ChainError::Call("Mock read failure".to_string()));
        }
        Ok(())
    }

    fn next_hash(state: &mut MockState) -> TxHash {
        state.nonce += 1;
        B256::from(U256::from(state.nonce).to_be_bytes::<32>())
    }
}

#[async_trait]
impl MarketReader for MockChain {
    fn market_address(&self) -> Address {
        self.market
    }

    async fn market_count(&self) -> Result<u64, ChainError> {
        self.simulate_latency().await;
        self.check_reads()?;
        Ok(self.state().markets.len() as u64)
    }

    async fn market_info(&self, market_id: u64) -> Result<Market, ChainError> {
        self.simulate_latency().await;
        self.check_reads()?;
        usize::try_from(market_id)
            .ok()
            .and_then(|idx| self.state().markets.get(idx).cloned())
            .ok_or_else(|| ChainError::Call(format!("market {} does not exist", market_id)))
    }

    async fn shares_balance(
        &self,
        market_id: u64,
        user: Address,
    ) -> Result<SharesBalance, ChainError> {
        self.simulate_latency().await;
        self.check_reads()?;
        Ok(self
            .state()
            .shares
            .get(&(market_id, user))
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError> {
        self.simulate_latency().await;
        self.check_reads()?;
        Ok(self
            .state()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn token_balance(&self, account: Address) -> Result<TokenBalance, ChainError> {
        self.simulate_latency().await;
        self.check_reads()?;
        Ok(TokenBalance {
            value: self.state().balances.get(&account).copied().unwrap_or_default(),
            symbol: "PMT".to_string(),
            decimals: 18,
        })
    }
}

#[async_trait]
impl MarketWriter for MockChain {
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_approve {
            return Err(ChainError::Call("Mock approval failure".to_string()));
        }

        let mut state = self.state();
        state.allowances.insert((self.sender, spender), amount);
        state.calls.push(ChainCall::Approve { spender, amount });
        Ok(Self::next_hash(&mut state))
    }

    async fn buy_shares(
        &self,
        market_id: u64,
        option: MarketOption,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_buy {
            return Err(ChainError::Call("Mock purchase failure".to_string()));
        }

        let mut state = self.state();
        let idx = usize::try_from(market_id)
            .ok()
            .filter(|idx| *idx < state.markets.len())
            .ok_or_else(|| ChainError::Call(format!("market {} does not exist", market_id)))?;

        let key = (self.sender, self.market);
        let allowance = state.allowances.get(&key).copied().unwrap_or_default();
        if allowance < amount {
            return Err(ChainError::Call("ERC20: insufficient allowance".to_string()));
        }
        state.allowances.insert(key, allowance - amount);

        match option {
            MarketOption::A => state.markets[idx].total_option_a_shares += amount,
            MarketOption::B => state.markets[idx].total_option_b_shares += amount,
        }

        let shares = state.shares.entry((market_id, self.sender)).or_default();
        match option {
            MarketOption::A => shares.option_a_shares += amount,
            MarketOption::B => shares.option_b_shares += amount,
        }

        state.calls.push(ChainCall::BuyShares {
            market_id,
            option,
            amount,
        });
        Ok(Self::next_hash(&mut state))
    }

    async fn claim_winnings(&self, market_id: u64) -> Result<TxHash, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_claim {
            return Err(ChainError::Call("Mock claim failure".to_string()));
        }

        let mut state = self.state();
        state.calls.push(ChainCall::ClaimWinnings { market_id });
        Ok(Self::next_hash(&mut state))
    }
}

#[async_trait]
impl TokenMinter for MockChain {
    async fn mint_to(&self, recipient: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_mint {
            return Err(ChainError::Call("Mock mint failure".to_string()));
        }

        let mut state = self.state();
        *state.balances.entry(recipient).or_default() += amount;
        state.calls.push(ChainCall::MintTo { recipient, amount });
        Ok(Self::next_hash(&mut state))
    }
}
