//! Key and address utilities.
//!
//! This module provides utilities for:
//! - Creating signers from hex private keys
//! - Computing wallet addresses
//! - Validating user-supplied addresses (EIP-55 aware)

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::error::{ChainError, ValidationError};

/// Create a LocalSigner from a hex-encoded private key.
///
/// The private key can be with or without the "0x" prefix.
pub fn create_signer(private_key: &str) -> Result<PrivateKeySigner, ChainError> {
    let key = private_key.strip_prefix("0x").unwrap_or(private_key);
    let bytes = hex::decode(key)
        .map_err(|e| ChainError::Setup(format!("Invalid private key hex: {}", e)))?;

    if bytes.len() != 32 {
        return Err(ChainError::Setup(format!(
            "Private key must be 32 bytes, got {}",
            bytes.len()
        )));
    }

    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&bytes);

    PrivateKeySigner::from_bytes(&key_bytes.into())
        .map_err(|e| ChainError::Setup(format!("Failed to create signer: {}", e)))
}

/// Get the wallet address from a private key.
pub fn address_from_private_key(private_key: &str) -> Result<Address, ChainError> {
    Ok(create_signer(private_key)?.address())
}

/// Parse a user-supplied chain address.
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and
/// all-uppercase digits are taken as-is; mixed case must match the EIP-55
/// checksum.
pub fn parse_address(input: &str) -> Result<Address, ValidationError> {
    let body = input.strip_prefix("0x").unwrap_or(input);

    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidAddress);
    }

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        return Address::parse_checksummed(format!("0x{}", body), None)
            .map_err(|_| ValidationError::InvalidAddress);
    }

    let bytes = hex::decode(body).map_err(|_| ValidationError::InvalidAddress)?;
    Ok(Address::from_slice(&bytes))
}
