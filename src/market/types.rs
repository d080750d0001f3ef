//! Market-related types for binary prediction markets.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One of the two options of a binary market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum MarketOption {
    /// First option (`isOptionA = true`).
    #[strum(to_string = "A", serialize = "a")]
    A,
    /// Second option.
    #[strum(to_string = "B", serialize = "b")]
    B,
}

impl MarketOption {
    /// Get the opposite option.
    pub fn opposite(&self) -> Self {
        match self {
            MarketOption::A => MarketOption::B,
            MarketOption::B => MarketOption::A,
        }
    }

    /// Value of the contract's `_isOptionA` flag.
    pub fn is_option_a(&self) -> bool {
        matches!(self, MarketOption::A)
    }
}

/// Settled outcome as reported by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
pub enum Outcome {
    /// No result yet.
    #[default]
    Unresolved,
    /// Option A won.
    A,
    /// Option B won.
    B,
}

impl Outcome {
    /// Decode the contract's `uint8` outcome. Unknown values read as unresolved.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Outcome::A,
            2 => Outcome::B,
            _ => Outcome::Unresolved,
        }
    }

    /// The winning option, if any.
    pub fn winner(&self) -> Option<MarketOption> {
        match self {
            Outcome::Unresolved => None,
            Outcome::A => Some(MarketOption::A),
            Outcome::B => Some(MarketOption::B),
        }
    }
}

/// Snapshot of one market as returned by `getMarketInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    /// Market question text.
    pub question: String,
    /// Label of option A.
    pub option_a: String,
    /// Label of option B.
    pub option_b: String,
    /// Unix timestamp (seconds) when trading ends.
    pub end_time: u64,
    /// Settled outcome.
    pub outcome: Outcome,
    /// Total option A shares (18-decimal fixed point).
    pub total_option_a_shares: U256,
    /// Total option B shares (18-decimal fixed point).
    pub total_option_b_shares: U256,
    /// Whether the contract marked the market resolved.
    pub resolved: bool,
}

impl Market {
    /// Label for the given option.
    pub fn option_name(&self, option: MarketOption) -> &str {
        match option {
            MarketOption::A => &self.option_a,
            MarketOption::B => &self.option_b,
        }
    }

    /// Total shares staked on the given option.
    pub fn total_shares(&self, option: MarketOption) -> U256 {
        match option {
            MarketOption::A => self.total_option_a_shares,
            MarketOption::B => self.total_option_b_shares,
        }
    }

    /// Check if trading has ended at `now` (unix seconds).
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.end_time
    }
}

/// A user's shares in one market, as returned by `getSharesBalance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SharesBalance {
    /// Option A shares.
    pub option_a_shares: U256,
    /// Option B shares.
    pub option_b_shares: U256,
}

impl SharesBalance {
    /// Shares held on the given option.
    pub fn shares(&self, option: MarketOption) -> U256 {
        match option {
            MarketOption::A => self.option_a_shares,
            MarketOption::B => self.option_b_shares,
        }
    }
}

/// ERC-20 balance of the connected account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    /// Balance in base units.
    pub value: U256,
    /// Token symbol.
    pub symbol: String,
    /// Token decimals.
    pub decimals: u8,
}

/// Connected wallet context, passed explicitly to components that need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    /// Connected account, if any.
    pub account: Option<Address>,
}

impl Session {
    /// Session with a connected account.
    pub fn connected(account: Address) -> Self {
        Self {
            account: Some(account),
        }
    }

    /// Session with no wallet connected.
    pub fn disconnected() -> Self {
        Self { account: None }
    }

    /// Whether a wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}
