//! Binary prediction market dashboard and test-token faucet.
//!
//! Markets live in an on-chain contract and are paid for with an ERC-20
//! token. This library reads market state, projects winnings, drives the
//! staged approve-then-buy purchase, and serves a faucet that mints test
//! tokens from a server-held key.
//!
//! # Winnings
//!
//! A winning share is paid back plus a pro-rata cut of the losing pool:
//!
//! ```text
//! user shares on A:     100
//! total shares on A:    400
//! total shares on B:    200
//! ─────────────────────────
//! winnings if A wins:   100 + 100 * 200 / 400 = 150
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`chain`]: Contract reads/writes (alloy RPC and in-memory mock)
//! - [`market`]: Market types, winnings and dashboard presentation
//! - [`trading`]: Purchase workflow, claims and notifications
//! - [`api`]: HTTP faucet, health and metrics
//! - [`signing`]: Keys and address validation
//! - [`utils`]: Utility functions

pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod signing;
pub mod trading;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
