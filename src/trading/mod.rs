//! Trading module for user actions against the market.
//!
//! This module handles:
//! - The staged share purchase workflow
//! - Winnings and faucet claims
//! - User-facing notifications

pub mod claims;
pub mod notification;
pub mod purchase;

pub use claims::{claim_winnings, faucet_notification, winnings_notification, FaucetClient};
pub use notification::{Notification, Severity};
pub use purchase::{
    failure_notification, parse_amount, PurchaseReceipt, PurchaseState, PurchaseStep,
    PurchaseWorkflow,
};
