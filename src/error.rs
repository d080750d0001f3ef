//! Unified error types for the prediction market service.

use thiserror::Error;

/// Unified error type for the prediction market service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Settings loaded but rejected by a validation check.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed user or configured input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Chain read/write error.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// Purchase workflow error.
    #[error("purchase error: {0}")]
    Purchase(#[from] PurchaseError),

    /// Faucet claim error.
    #[error("claim error: {0}")]
    Claim(#[from] ClaimError),
}

/// Input rejected before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Malformed chain address.
    #[error("Invalid Ethereum address")]
    InvalidAddress,

    /// Zero, negative or non-numeric amount.
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    /// Confirm pressed without an option or with an empty amount.
    #[error("Must select an option and enter an amount greater than 0")]
    IncompleteIntent,
}

/// Errors from contract reads and writes.
#[derive(Error, Debug)]
pub enum ChainError {
    /// Contract call or RPC transport failed.
    #[error("{0}")]
    Call(String),

    /// Transaction was sent but confirmation failed or reverted.
    #[error("transaction {tx_hash} failed: {reason}")]
    Reverted {
        /// Hash of the failed transaction.
        tx_hash: String,
        /// Reason for failure.
        reason: String,
    },

    /// No signing key is available for a write.
    #[error("no signer configured for write call")]
    NoSigner,

    /// Malformed RPC endpoint, key or contract address.
    #[error("invalid chain setup: {0}")]
    Setup(String),
}

/// Purchase workflow errors.
#[derive(Error, Debug)]
pub enum PurchaseError {
    /// Inline validation message.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Approval or purchase transaction failed.
    #[error("{0}")]
    Transaction(#[from] ChainError),

    /// Action requested from a step that does not offer it.
    #[error("cannot {action} while {step}")]
    WrongStep {
        /// Requested action.
        action: &'static str,
        /// Current step.
        step: String,
    },
}

/// Token faucet errors.
#[derive(Error, Debug)]
pub enum ClaimError {
    /// Recipient address rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Mint transaction failed.
    #[error("{0}")]
    Mint(#[from] ChainError),

    /// Faucet server answered with an error.
    #[error("{0}")]
    Rejected(String),

    /// Faucet server unreachable or answered with garbage.
    #[error("faucet request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
