//! Market module for binary prediction markets.
//!
//! This module handles:
//! - Market, share and session types
//! - Fixed-point unit conversions
//! - Winnings projections
//! - Read-only card presentation and dashboard loading

pub mod dashboard;
pub mod types;
pub mod units;
pub mod view;
pub mod winnings;

pub use dashboard::{load_card, BalanceDisplay, Dashboard};
pub use types::{Market, MarketOption, Outcome, Session, SharesBalance, TokenBalance};
pub use view::{MarketCard, MarketCategory, Progress};
pub use winnings::{calculate_winnings, Winnings};
